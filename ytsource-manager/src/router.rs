//! Identifier classification.
//!
//! Turns a user-supplied identifier (URL, bare id, or search query) into a
//! [`Route`]. Classification is pure except for `watch_videos` links, which
//! need one request to learn where the site redirects them.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, instrument};
use url::Url;
use ytsource_core::LoadRequest;
use ytsource_fetch::{HttpError, HttpInterface};

use crate::error::LoadError;
use crate::options::SourceOptions;
use crate::url_tools::UrlInfo;

/// Prefix of a general search query.
pub const SEARCH_PREFIX: &str = "ytsearch:";

/// Prefix of a music search query.
pub const MUSIC_SEARCH_PREFIX: &str = "ytmsearch:";

/// Endpoint that turns a list of video ids into an anonymous playlist.
pub const WATCH_VIDEOS_URL: &str = "https://www.youtube.com/watch_videos";

/// Most `watch_videos` redirects followed for one identifier.
pub const MAX_REROUTES: usize = 5;

/// Length of a video id.
const VIDEO_ID_LENGTH: usize = 11;

/// Prefix of auto-generated mixes.
const MIX_PREFIX: &str = "RD";

/// Account-bound playlists (liked videos, watch later, liked music).
const PRIVATE_PLAYLIST_PREFIXES: [&str; 3] = ["LL", "WL", "LM"];

// ============================================================================
// Regex Patterns
// ============================================================================

const PROTOCOL: &str = r"(?:http://|https://|)";
const DOMAIN: &str = r"(?:www\.|m\.|music\.|)youtube\.com";
const SHORT_DOMAIN: &str = r"(?:www\.|)youtu\.be";

static VIDEO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid video id regex"));

static PLAYLIST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:PL|UU)[a-zA-Z0-9_-]+$").expect("valid playlist id regex"));

static MAIN_DOMAIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^{PROTOCOL}{DOMAIN}/.*$")).expect("valid main domain regex")
});

static SHORT_HAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^{PROTOCOL}(?:{DOMAIN}/(?:live|embed|shorts)|{SHORT_DOMAIN})/(?<video_id>.*)$"
    ))
    .expect("valid short-hand regex")
});

// ============================================================================
// Route
// ============================================================================

/// Where an identifier leads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "route", content = "request", rename_all = "snake_case")]
pub enum Route {
    /// Not an identifier this source handles.
    Unroutable,
    /// Recognised, but deliberately empty.
    Empty,
    /// A load to run against the clients.
    Load(LoadRequest),
}

impl Route {
    /// Returns the load request, if any.
    pub fn request(&self) -> Option<&LoadRequest> {
        match self {
            Self::Load(request) => Some(request),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unroutable => f.write_str("unroutable"),
            Self::Empty => f.write_str("empty"),
            Self::Load(request) => write!(f, "load {request}"),
        }
    }
}

impl From<LoadRequest> for Route {
    fn from(request: LoadRequest) -> Self {
        Self::Load(request)
    }
}

/// Result of a single classification step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Final answer.
    Route(Route),
    /// Request `url` and classify wherever it redirects.
    FollowRedirect {
        /// The `watch_videos` URL to probe.
        url: Url,
    },
}

// ============================================================================
// Identifier Router
// ============================================================================

/// Classifies identifiers into routes.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRouter {
    options: SourceOptions,
    watch_videos_endpoint: Option<Url>,
}

impl IdentifierRouter {
    /// Creates a router with the given options.
    pub fn new(options: SourceOptions) -> Self {
        Self {
            options,
            watch_videos_endpoint: None,
        }
    }

    /// Overrides the endpoint used to resolve `watch_videos` links.
    #[must_use]
    pub fn with_watch_videos_endpoint(mut self, endpoint: Url) -> Self {
        self.watch_videos_endpoint = Some(endpoint);
        self
    }

    /// Returns the options.
    pub fn options(&self) -> &SourceOptions {
        &self.options
    }

    /// Classifies `identifier` without touching the network.
    ///
    /// Rules, first match wins:
    ///
    /// 1. `ytsearch:` / `ytmsearch:` prefixes. With search disabled this is
    ///    unroutable, with no further rules tried.
    /// 2. Main site URLs: `/watch?v=`, `/playlist?list=`, `/watch_videos?video_ids=`.
    /// 3. Bare video ids.
    /// 4. Bare `PL`/`UU` playlist ids.
    /// 5. Short-hand URLs (`youtu.be/`, `/live/`, `/embed/`, `/shorts/`).
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::InvalidUrl`] if a main site URL cannot be parsed.
    pub fn classify(&self, identifier: &str) -> Result<Classification, LoadError> {
        if let Some(query) = identifier.strip_prefix(SEARCH_PREFIX) {
            return Ok(Classification::Route(
                self.route_search(query, |query| LoadRequest::Search { query }),
            ));
        }

        if let Some(query) = identifier.strip_prefix(MUSIC_SEARCH_PREFIX) {
            return Ok(Classification::Route(
                self.route_search(query, |query| LoadRequest::MusicSearch { query }),
            ));
        }

        if MAIN_DOMAIN_RE.is_match(identifier) {
            if let Some(classification) = self.classify_main_domain(identifier)? {
                return Ok(classification);
            }
        }

        if self.options.allow_direct_video_ids && VIDEO_ID_RE.is_match(identifier) {
            return Ok(Classification::Route(route_from_video_id(identifier, None)));
        }

        if self.options.allow_direct_playlist_ids && PLAYLIST_ID_RE.is_match(identifier) {
            return Ok(Classification::Route(
                LoadRequest::playlist(identifier, None).into(),
            ));
        }

        if let Some(captures) = SHORT_HAND_RE.captures(identifier) {
            let video_id = captures.name("video_id").map_or("", |m| m.as_str());
            return Ok(Classification::Route(route_from_video_id(video_id, None)));
        }

        Ok(Classification::Route(Route::Unroutable))
    }

    /// Classifies `identifier`, following `watch_videos` redirects.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, the `watch_videos` request fails
    /// or does not redirect, or more than [`MAX_REROUTES`] redirects would be
    /// followed.
    #[instrument(skip(self, http))]
    pub async fn route(&self, http: &mut HttpInterface, identifier: &str) -> Result<Route, LoadError> {
        let mut current = identifier.to_string();
        let mut followed = 0;

        loop {
            match self.classify(&current)? {
                Classification::Route(route) => {
                    debug!(%route, "Identifier classified");
                    return Ok(route);
                }
                Classification::FollowRedirect { .. } if followed == MAX_REROUTES => {
                    return Err(LoadError::TooManyReroutes(MAX_REROUTES));
                }
                Classification::FollowRedirect { url } => {
                    followed += 1;
                    current = probe_watch_videos(http, &url).await?;
                    debug!(redirect = %current, followed, "Re-classifying watch_videos redirect");
                }
            }
        }
    }

    fn route_search(&self, query: &str, request: impl FnOnce(String) -> LoadRequest) -> Route {
        if !self.options.allow_search {
            return Route::Unroutable;
        }

        let query = query.trim();
        if query.is_empty() {
            return Route::Empty;
        }

        request(query.to_string()).into()
    }

    /// Returns `None` when the URL shape is not handled here, so the
    /// remaining rules get a chance.
    fn classify_main_domain(&self, identifier: &str) -> Result<Option<Classification>, LoadError> {
        let info = UrlInfo::parse(identifier)?;

        let classification = match info.path.as_str() {
            "/watch" => info
                .parameter("v")
                .map(|video_id| Classification::Route(route_from_video_id(video_id, Some(&info)))),
            "/playlist" => info.parameter("list").map(|playlist_id| {
                let request = match playlist_id.strip_prefix(MIX_PREFIX) {
                    Some(video_id) => LoadRequest::mix(playlist_id, video_id),
                    None => LoadRequest::playlist(playlist_id, None),
                };
                Classification::Route(request.into())
            }),
            "/watch_videos" => match info.parameter("video_ids") {
                Some(video_ids) => {
                    let mut url = self.watch_videos_endpoint()?;
                    url.query_pairs_mut().append_pair("video_ids", video_ids);
                    Some(Classification::FollowRedirect { url })
                }
                None => None,
            },
            _ => None,
        };

        Ok(classification)
    }

    fn watch_videos_endpoint(&self) -> Result<Url, LoadError> {
        match &self.watch_videos_endpoint {
            Some(endpoint) => Ok(endpoint.clone()),
            None => Url::parse(WATCH_VIDEOS_URL)
                .map_err(|e| LoadError::InvalidUrl(format!("{WATCH_VIDEOS_URL}: {e}"))),
        }
    }
}

/// Routes a candidate video id, promoting it to a mix or playlist load when a
/// `list` parameter accompanies it.
fn route_from_video_id(video_id: &str, info: Option<&UrlInfo>) -> Route {
    let video_id = truncate_video_id(video_id);

    if !VIDEO_ID_RE.is_match(video_id) {
        return Route::Empty;
    }

    if let Some(playlist_id) = info.and_then(|info| info.parameter("list")) {
        if playlist_id.starts_with(MIX_PREFIX) {
            return LoadRequest::mix(playlist_id, video_id).into();
        }

        if !PRIVATE_PLAYLIST_PREFIXES
            .iter()
            .any(|prefix| playlist_id.starts_with(prefix))
        {
            return LoadRequest::playlist(playlist_id, Some(video_id.to_string())).into();
        }
    }

    LoadRequest::video(video_id).into()
}

fn truncate_video_id(video_id: &str) -> &str {
    match video_id.char_indices().nth(VIDEO_ID_LENGTH) {
        Some((end, _)) => &video_id[..end],
        None => video_id,
    }
}

/// Requests a `watch_videos` URL without following redirects and returns the
/// first redirect target.
async fn probe_watch_videos(http: &mut HttpInterface, url: &Url) -> Result<String, LoadError> {
    let follow = http.context().follow_redirects();
    http.context_mut().set_follow_redirects(false);
    let result = http.get(url.as_str()).await;
    http.context_mut().set_follow_redirects(follow);

    let response = result.map_err(LoadError::WatchVideosProbe)?;
    let status = response.status();

    if status.is_redirection() {
        return match http.context().redirect_locations().first() {
            Some(target) => Ok(target.to_string()),
            None => Err(LoadError::WatchVideosNotRedirected),
        };
    }

    if status.is_success() {
        return Err(LoadError::WatchVideosNotRedirected);
    }

    Err(LoadError::WatchVideosProbe(HttpError::UnexpectedStatus {
        status: status.as_u16(),
        context: "watch_videos response".to_string(),
    }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> IdentifierRouter {
        IdentifierRouter::default()
    }

    fn classify(identifier: &str) -> Route {
        classify_with(&router(), identifier)
    }

    fn classify_with(router: &IdentifierRouter, identifier: &str) -> Route {
        match router.classify(identifier).unwrap() {
            Classification::Route(route) => route,
            Classification::FollowRedirect { url } => panic!("unexpected redirect to {url}"),
        }
    }

    fn video(id: &str) -> Route {
        LoadRequest::video(id).into()
    }

    #[test]
    fn test_search_prefixes() {
        assert_eq!(
            classify("ytsearch:  never gonna give you up "),
            LoadRequest::Search {
                query: "never gonna give you up".into()
            }
            .into()
        );
        assert_eq!(
            classify("ytmsearch:rick astley"),
            LoadRequest::MusicSearch {
                query: "rick astley".into()
            }
            .into()
        );
    }

    #[test]
    fn test_blank_search_is_empty() {
        assert_eq!(classify("ytsearch:   "), Route::Empty);
        assert_eq!(classify("ytmsearch:"), Route::Empty);
    }

    #[test]
    fn test_search_disabled_is_unroutable() {
        let router = IdentifierRouter::new(SourceOptions::new().with_allow_search(false));
        assert_eq!(classify_with(&router, "ytsearch:foo"), Route::Unroutable);
        assert_eq!(classify_with(&router, "ytmsearch:"), Route::Unroutable);
        // a search prefix never falls through to other rules
        assert_eq!(classify_with(&router, "ytsearch:dQw4w9WgXcQ"), Route::Unroutable);
    }

    #[test]
    fn test_watch_urls_all_hosts() {
        for host in ["", "www.", "m.", "music."] {
            for scheme in ["", "http://", "https://"] {
                let url = format!("{scheme}{host}youtube.com/watch?v=dQw4w9WgXcQ");
                assert_eq!(classify(&url), video("dQw4w9WgXcQ"), "{url}");
            }
        }
    }

    #[test]
    fn test_watch_with_playlist() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PLabc123"),
            LoadRequest::playlist("PLabc123", Some("dQw4w9WgXcQ".into())).into()
        );
    }

    #[test]
    fn test_watch_with_mix() {
        assert_eq!(
            classify("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=RDdQw4w9WgXcQ"),
            LoadRequest::mix("RDdQw4w9WgXcQ", "dQw4w9WgXcQ").into()
        );
    }

    #[test]
    fn test_watch_with_private_playlists() {
        for list in ["LL", "WLxyz", "LMabc"] {
            let url = format!("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list={list}");
            assert_eq!(classify(&url), video("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn test_playlist_urls() {
        assert_eq!(
            classify("https://www.youtube.com/playlist?list=PLxyz"),
            LoadRequest::playlist("PLxyz", None).into()
        );
        assert_eq!(
            classify("https://music.youtube.com/playlist?list=RDdQw4w9WgXcQ"),
            LoadRequest::mix("RDdQw4w9WgXcQ", "dQw4w9WgXcQ").into()
        );
    }

    #[test]
    fn test_watch_videos_needs_probe() {
        let classification = router()
            .classify("https://www.youtube.com/watch_videos?video_ids=dQw4w9WgXcQ,9bZkp7q19f0")
            .unwrap();

        let Classification::FollowRedirect { url } = classification else {
            panic!("expected a redirect probe");
        };
        assert_eq!(url.path(), "/watch_videos");
        assert_eq!(
            url.query_pairs().find(|(k, _)| k == "video_ids").unwrap().1,
            "dQw4w9WgXcQ,9bZkp7q19f0"
        );
    }

    #[test]
    fn test_direct_ids() {
        assert_eq!(classify("dQw4w9WgXcQ"), video("dQw4w9WgXcQ"));
        assert_eq!(
            classify("PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI"),
            LoadRequest::playlist("PLFgquLnL59alCl_2TQvOiD5Vgm1hCaGSI", None).into()
        );
        assert_eq!(classify("UUuAXFkgsw1L7xaCfnd5JJOw"), LoadRequest::playlist("UUuAXFkgsw1L7xaCfnd5JJOw", None).into());
    }

    #[test]
    fn test_direct_ids_disabled() {
        let router = IdentifierRouter::new(
            SourceOptions::new()
                .with_allow_direct_video_ids(false)
                .with_allow_direct_playlist_ids(false),
        );
        assert_eq!(classify_with(&router, "dQw4w9WgXcQ"), Route::Unroutable);
        assert_eq!(classify_with(&router, "PLxyz"), Route::Unroutable);
        // URLs are unaffected
        assert_eq!(
            classify_with(&router, "youtu.be/dQw4w9WgXcQ"),
            video("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_short_hand() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "www.youtu.be/dQw4w9WgXcQ?t=10",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://youtube.com/live/dQw4w9WgXcQ?feature=share",
            "http://m.youtube.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(classify(url), video("dQw4w9WgXcQ"), "{url}");
        }
    }

    #[test]
    fn test_invalid_video_id_is_empty() {
        assert_eq!(classify("https://youtu.be/abc"), Route::Empty);
        assert_eq!(classify("https://www.youtube.com/watch?v=bad!id!here"), Route::Empty);
    }

    #[test]
    fn test_unroutable() {
        assert_eq!(classify("https://soundcloud.com/artist/track"), Route::Unroutable);
        assert_eq!(classify("hello world"), Route::Unroutable);
        assert_eq!(classify("https://www.youtube.com/channel/UC123"), Route::Unroutable);
    }

    #[test]
    fn test_route_display() {
        assert_eq!(Route::Unroutable.to_string(), "unroutable");
        assert_eq!(video("dQw4w9WgXcQ").to_string(), "load video dQw4w9WgXcQ");
    }
}
