//! The YouTube source manager.
//!
//! Ties the router, the client pipeline and the shared transport together
//! behind [`YoutubeSourceManager::load_item`].

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;
use ytsource_core::AudioItem;
use ytsource_fetch::{
    AccessTokenTracker, Client, ClientAttempt, ClientFailure, ClientPipeline, HttpContextFilter,
    HttpInterface, HttpInterfaceManager, HttpInterfaceManagerBuilder, OAuth2Handler, ProxyHandler,
    TransportConfig, YoutubeContextFilter,
};

use crate::error::LoadError;
use crate::options::SourceOptions;
use crate::router::{IdentifierRouter, Route};

/// Name this source reports to the host player.
pub const SOURCE_NAME: &str = "youtube";

// ============================================================================
// Load Report
// ============================================================================

/// Everything that happened while loading one identifier.
#[derive(Debug)]
pub struct LoadReport {
    /// `Ok(None)` when unroutable or nothing found, `Ok(Some(NoTrack))` for an
    /// empty match, `Err` on failure.
    pub result: Result<Option<AudioItem>, LoadError>,
    /// The route of the final attempt, if classification succeeded.
    pub route: Option<Route>,
    /// Every client consulted, across both attempts when retried.
    pub attempts: Vec<ClientAttempt>,
    /// Faults recorded before a successful client.
    pub secondary: Vec<ClientFailure>,
    /// Whether the load was retried after a transient network fault.
    pub retried: bool,
}

impl LoadReport {
    fn failed(error: LoadError) -> Self {
        Self {
            result: Err(error),
            route: None,
            attempts: Vec::new(),
            secondary: Vec::new(),
            retried: false,
        }
    }

    fn resolved(route: Route, item: Option<AudioItem>) -> Self {
        Self {
            result: Ok(item),
            route: Some(route),
            attempts: Vec::new(),
            secondary: Vec::new(),
            retried: false,
        }
    }
}

// ============================================================================
// Source Manager
// ============================================================================

/// Resolves identifiers into items using an ordered list of clients.
///
/// Safe to share between tasks; every load uses its own [`HttpInterface`].
pub struct YoutubeSourceManager {
    http: HttpInterfaceManager,
    router: IdentifierRouter,
    pipeline: ClientPipeline,
    oauth2: Option<Arc<dyn OAuth2Handler>>,
}

impl YoutubeSourceManager {
    /// Creates a builder.
    pub fn builder() -> YoutubeSourceManagerBuilder {
        YoutubeSourceManagerBuilder::new()
    }

    /// Returns the source name.
    pub fn source_name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// Returns the options.
    pub fn options(&self) -> &SourceOptions {
        self.router.options()
    }

    /// Returns the router.
    pub fn router(&self) -> &IdentifierRouter {
        &self.router
    }

    /// Returns the clients in dispatch order.
    pub fn clients(&self) -> &[Arc<dyn Client>] {
        self.pipeline.clients()
    }

    /// Finds a client by identifier.
    pub fn client(&self, identifier: &str) -> Option<&Arc<dyn Client>> {
        self.pipeline.client(identifier)
    }

    /// Returns the shared transport.
    pub fn http_interface_manager(&self) -> &HttpInterfaceManager {
        &self.http
    }

    /// Opens a fresh scoped interface on the shared transport.
    pub fn interface(&self) -> HttpInterface {
        self.http.interface()
    }

    /// Sets how many playlist pages every client fetches.
    pub fn set_playlist_page_count(&self, count: u32) {
        debug!(count, "Updating playlist page count");
        self.pipeline.set_playlist_page_count(count);
    }

    /// Enables OAuth with the given refresh token.
    ///
    /// `None` starts account linking unless `skip_initialization` is set.
    pub fn use_oauth2(&self, refresh_token: Option<String>, skip_initialization: bool) {
        let Some(oauth2) = &self.oauth2 else {
            warn!("OAuth requested but no OAuth handler is configured, ignoring");
            return;
        };

        oauth2.set_refresh_token(refresh_token, skip_initialization);

        if !self.pipeline.any_supports_oauth() {
            warn!(
                "OAuth has been enabled without registering any OAuth-compatible clients. \
                 Requests will not carry an access token."
            );
        }
    }

    /// Returns the current OAuth refresh token.
    pub fn oauth2_refresh_token(&self) -> Option<String> {
        self.oauth2.as_ref().and_then(|h| h.refresh_token())
    }

    /// Resolves `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if no client could load the item, the content is
    /// unplayable, or a `watch_videos` link could not be followed.
    pub async fn load_item(&self, identifier: &str) -> Result<Option<AudioItem>, LoadError> {
        self.load_item_traced(identifier).await.result
    }

    /// Resolves `identifier`, aborting in-flight requests when `token` is
    /// cancelled.
    ///
    /// # Errors
    ///
    /// See [`load_item`](Self::load_item).
    pub async fn load_item_with_cancellation(
        &self,
        identifier: &str,
        token: &CancellationToken,
    ) -> Result<Option<AudioItem>, LoadError> {
        self.load(identifier, Some(token)).await.result
    }

    /// Resolves `identifier` and returns the full report.
    pub async fn load_item_traced(&self, identifier: &str) -> LoadReport {
        self.load(identifier, None).await
    }

    /// Runs one attempt, and a second one only after a transient network
    /// fault. Unplayable content is never retried.
    #[instrument(skip(self, token))]
    async fn load(&self, identifier: &str, token: Option<&CancellationToken>) -> LoadReport {
        let first = self.load_item_once(identifier, token).await;

        let error = match &first.result {
            Err(error) if error.is_retriable() => error,
            _ => return first,
        };

        warn!(error = %error, "Transient network fault, retrying once");

        let mut second = self.load_item_once(identifier, token).await;
        let mut attempts = first.attempts;
        attempts.append(&mut second.attempts);
        second.attempts = attempts;
        second.retried = true;
        second
    }

    /// Classifies and dispatches once on a fresh interface, which is released
    /// on every exit path.
    async fn load_item_once(&self, identifier: &str, token: Option<&CancellationToken>) -> LoadReport {
        let mut http = match token {
            Some(token) => self.http.interface_with_token(token),
            None => self.http.interface(),
        };

        let route = match self.router.route(&mut http, identifier).await {
            Ok(route) => route,
            Err(error) => return LoadReport::failed(error),
        };

        let request = match route {
            Route::Unroutable => return LoadReport::resolved(Route::Unroutable, None),
            Route::Empty => return LoadReport::resolved(Route::Empty, Some(AudioItem::NoTrack)),
            Route::Load(request) => request,
        };

        let outcome = self.pipeline.dispatch(&mut http, identifier, &request).await;

        if let Some(client) = outcome.loaded_by() {
            info!(client, duration = ?outcome.duration, "Item loaded");
        }

        LoadReport {
            result: outcome.result.map_err(LoadError::from),
            route: Some(Route::Load(request)),
            attempts: outcome.attempts,
            secondary: outcome.suppressed,
            retried: false,
        }
    }
}

impl std::fmt::Debug for YoutubeSourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoutubeSourceManager")
            .field("options", self.router.options())
            .field("clients", &self.pipeline)
            .field("oauth2", &self.oauth2.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`YoutubeSourceManager`].
///
/// All transport settings are fixed when [`build`](Self::build) runs.
#[derive(Default)]
pub struct YoutubeSourceManagerBuilder {
    options: SourceOptions,
    clients: Vec<Arc<dyn Client>>,
    transport: TransportConfig,
    configure_proxy: bool,
    filters: Vec<Arc<dyn HttpContextFilter>>,
    oauth2: Option<Arc<dyn OAuth2Handler>>,
    token_tracker: Option<Arc<dyn AccessTokenTracker>>,
    watch_videos_endpoint: Option<Url>,
}

impl YoutubeSourceManagerBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the options.
    #[must_use]
    pub fn options(mut self, options: SourceOptions) -> Self {
        self.options = options;
        self
    }

    /// Appends a client. Clients are tried in the order they are added.
    #[must_use]
    pub fn client(mut self, client: Arc<dyn Client>) -> Self {
        self.clients.push(client);
        self
    }

    /// Appends several clients, in order.
    #[must_use]
    pub fn clients(mut self, clients: impl IntoIterator<Item = Arc<dyn Client>>) -> Self {
        self.clients.extend(clients);
        self
    }

    /// Sets the transport configuration.
    #[must_use]
    pub fn transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Requests proxy configuration. `None` is accepted and logged.
    #[must_use]
    pub fn proxy(mut self, proxy: Option<Url>) -> Self {
        self.transport.proxy = proxy;
        self.configure_proxy = true;
        self
    }

    /// Adds an extra context filter after the built-in one.
    #[must_use]
    pub fn filter(mut self, filter: Arc<dyn HttpContextFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Sets the OAuth2 handler.
    #[must_use]
    pub fn oauth2(mut self, handler: Arc<dyn OAuth2Handler>) -> Self {
        self.oauth2 = Some(handler);
        self
    }

    /// Sets the visitor data tracker.
    #[must_use]
    pub fn token_tracker(mut self, tracker: Arc<dyn AccessTokenTracker>) -> Self {
        self.token_tracker = Some(tracker);
        self
    }

    /// Overrides the endpoint used to resolve `watch_videos` links.
    #[must_use]
    pub fn watch_videos_endpoint(mut self, endpoint: Url) -> Self {
        self.watch_videos_endpoint = Some(endpoint);
        self
    }

    /// Builds the manager.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Transport`] if the proxy URI is unusable or the
    /// HTTP client cannot be built.
    pub fn build(self) -> Result<YoutubeSourceManager, LoadError> {
        let mut context_filter = YoutubeContextFilter::new();
        if let Some(oauth2) = &self.oauth2 {
            context_filter = context_filter.with_oauth2(Arc::clone(oauth2));
        }
        if let Some(tracker) = self.token_tracker {
            context_filter = context_filter.with_token_tracker(tracker);
        }

        let mut http = HttpInterfaceManagerBuilder::from_config(&self.transport)
            .filter(Arc::new(context_filter));
        for filter in self.filters {
            http = http.filter(filter);
        }

        if self.configure_proxy || self.transport.proxy.is_some() {
            http = ProxyHandler::init(http, self.transport.proxy.as_ref())?;
        }

        let mut router = IdentifierRouter::new(self.options);
        if let Some(endpoint) = self.watch_videos_endpoint {
            router = router.with_watch_videos_endpoint(endpoint);
        }

        if self.clients.is_empty() {
            debug!("No clients registered, every load will find nothing");
        }

        let manager = YoutubeSourceManager {
            http: http.build()?,
            router,
            pipeline: ClientPipeline::new(self.clients),
            oauth2: self.oauth2,
        };

        debug!(?manager, "Source manager built");
        Ok(manager)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use ytsource_fetch::ClientResult;

    struct NamedClient {
        id: &'static str,
        oauth: bool,
    }

    #[async_trait]
    impl Client for NamedClient {
        fn identifier(&self) -> &str {
            self.id
        }

        fn supports_oauth(&self) -> bool {
            self.oauth
        }

        fn set_playlist_page_count(&self, _count: u32) {}

        async fn load_video(&self, _http: &mut HttpInterface, _video_id: &str) -> ClientResult {
            Ok(None)
        }

        async fn load_playlist(
            &self,
            _http: &mut HttpInterface,
            _playlist_id: &str,
            _selected: Option<&str>,
        ) -> ClientResult {
            Ok(None)
        }

        async fn load_search(&self, _http: &mut HttpInterface, _query: &str) -> ClientResult {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingOAuth {
        token: Mutex<Option<String>>,
    }

    #[async_trait]
    impl OAuth2Handler for RecordingOAuth {
        fn set_refresh_token(&self, refresh_token: Option<String>, _skip: bool) {
            *self.token.lock().unwrap() = refresh_token;
        }

        fn refresh_token(&self) -> Option<String> {
            self.token.lock().unwrap().clone()
        }

        async fn access_token(&self) -> Option<String> {
            None
        }
    }

    fn manager_with(clients: Vec<Arc<dyn Client>>) -> YoutubeSourceManager {
        YoutubeSourceManager::builder()
            .clients(clients)
            .oauth2(Arc::new(RecordingOAuth::default()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_source_name_and_lookup() {
        let manager = manager_with(vec![
            Arc::new(NamedClient { id: "MUSIC", oauth: false }),
            Arc::new(NamedClient { id: "TV", oauth: true }),
        ]);

        assert_eq!(manager.source_name(), "youtube");
        let ids: Vec<_> = manager.clients().iter().map(|c| c.identifier()).collect();
        assert_eq!(ids, vec!["MUSIC", "TV"]);
        assert!(manager.client("TV").unwrap().supports_oauth());
        assert!(manager.client("WEB").is_none());
    }

    #[test]
    fn test_oauth_refresh_token_round_trip() {
        let manager = manager_with(vec![Arc::new(NamedClient { id: "TV", oauth: true })]);
        assert!(manager.oauth2_refresh_token().is_none());

        manager.use_oauth2(Some("1//refresh".into()), true);
        assert_eq!(manager.oauth2_refresh_token().as_deref(), Some("1//refresh"));
    }

    #[test]
    fn test_oauth_without_handler() {
        let manager = YoutubeSourceManager::builder().build().unwrap();
        manager.use_oauth2(Some("token".into()), false);
        assert!(manager.oauth2_refresh_token().is_none());
    }

    #[test]
    fn test_bad_proxy_rejected() {
        let result = YoutubeSourceManager::builder()
            .proxy(Some(Url::parse("socks5://proxy.invalid:1080").unwrap()))
            .build();
        assert!(matches!(result, Err(LoadError::Transport(_))));
    }

    #[tokio::test]
    async fn test_unroutable_and_empty() {
        let manager = manager_with(vec![Arc::new(NamedClient { id: "WEB", oauth: false })]);

        assert!(manager.load_item("https://example.com/").await.unwrap().is_none());
        assert_eq!(
            manager.load_item("ytsearch:  ").await.unwrap(),
            Some(AudioItem::NoTrack)
        );
    }

    #[tokio::test]
    async fn test_nothing_found() {
        let manager = manager_with(vec![Arc::new(NamedClient { id: "WEB", oauth: false })]);
        let report = manager.load_item_traced("dQw4w9WgXcQ").await;

        assert!(matches!(report.result, Ok(None)));
        assert_eq!(report.attempts.len(), 1);
        assert!(!report.retried);
    }
}
