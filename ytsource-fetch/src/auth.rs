//! Request decoration for auth and cookie handling.
//!
//! The token machinery itself (OAuth device flow, refresh, visitor data) lives
//! outside this crate. It is reached through [`OAuth2Handler`] and
//! [`AccessTokenTracker`], and applied by [`YoutubeContextFilter`] before each
//! request.

use async_trait::async_trait;
use reqwest::Request;
use reqwest::header::{self, HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::{OAUTH_CLIENT_ATTRIBUTE, RequestContext};
use crate::host::http::HttpContextFilter;

/// Header carrying visitor data.
pub const VISITOR_ID_HEADER: HeaderName = HeaderName::from_static("x-goog-visitor-id");

// ============================================================================
// Collaborator Traits
// ============================================================================

/// OAuth2 token source.
#[async_trait]
pub trait OAuth2Handler: Send + Sync {
    /// Sets the refresh token.
    ///
    /// `None` starts account linking unless `skip_initialization` is set.
    fn set_refresh_token(&self, refresh_token: Option<String>, skip_initialization: bool);

    /// Returns the current refresh token.
    fn refresh_token(&self) -> Option<String>;

    /// Returns a valid access token, or `None` when no account is linked.
    async fn access_token(&self) -> Option<String>;
}

/// Source of anonymous visitor data.
#[async_trait]
pub trait AccessTokenTracker: Send + Sync {
    /// Returns the current visitor id, fetching one if needed.
    async fn visitor_id(&self) -> Option<String>;
}

// ============================================================================
// Context Filter
// ============================================================================

/// Filter installed on every interface of a source manager.
///
/// - strips `Cookie` headers, the transport is cookieless
/// - adds visitor data when a tracker is present
/// - adds `Authorization: Bearer` when the current client is OAuth-capable
#[derive(Default)]
pub struct YoutubeContextFilter {
    oauth2: Option<Arc<dyn OAuth2Handler>>,
    token_tracker: Option<Arc<dyn AccessTokenTracker>>,
}

impl YoutubeContextFilter {
    /// Creates a filter with no collaborators.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the OAuth2 handler.
    #[must_use]
    pub fn with_oauth2(mut self, handler: Arc<dyn OAuth2Handler>) -> Self {
        self.oauth2 = Some(handler);
        self
    }

    /// Sets the visitor data tracker.
    #[must_use]
    pub fn with_token_tracker(mut self, tracker: Arc<dyn AccessTokenTracker>) -> Self {
        self.token_tracker = Some(tracker);
        self
    }
}

#[async_trait]
impl HttpContextFilter for YoutubeContextFilter {
    async fn on_request(&self, ctx: &RequestContext, request: &mut Request) {
        request.headers_mut().remove(header::COOKIE);

        if let Some(tracker) = &self.token_tracker {
            if let Some(visitor_id) = tracker.visitor_id().await {
                match HeaderValue::from_str(&visitor_id) {
                    Ok(value) => {
                        request.headers_mut().insert(VISITOR_ID_HEADER, value);
                    }
                    Err(_) => warn!("Visitor id is not a valid header value, skipping"),
                }
            }
        }

        if ctx.flag(OAUTH_CLIENT_ATTRIBUTE) != Some(true) {
            return;
        }

        let Some(oauth2) = &self.oauth2 else {
            return;
        };

        if let Some(token) = oauth2.access_token().await {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    request.headers_mut().insert(header::AUTHORIZATION, value);
                    debug!("Applied OAuth access token");
                }
                Err(_) => warn!("OAuth access token is not a valid header value, skipping"),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use std::sync::Mutex;
    use url::Url;

    struct StaticOAuth {
        refresh: Mutex<Option<String>>,
    }

    #[async_trait]
    impl OAuth2Handler for StaticOAuth {
        fn set_refresh_token(&self, refresh_token: Option<String>, _skip: bool) {
            *self.refresh.lock().unwrap() = refresh_token;
        }

        fn refresh_token(&self) -> Option<String> {
            self.refresh.lock().unwrap().clone()
        }

        async fn access_token(&self) -> Option<String> {
            Some("abc".to_string())
        }
    }

    struct StaticVisitor;

    #[async_trait]
    impl AccessTokenTracker for StaticVisitor {
        async fn visitor_id(&self) -> Option<String> {
            Some("CgtWaXNpdG9y".to_string())
        }
    }

    fn request() -> Request {
        let mut request = Request::new(
            Method::GET,
            Url::parse("https://www.youtube.com/youtubei/v1/player").unwrap(),
        );
        request
            .headers_mut()
            .insert(header::COOKIE, HeaderValue::from_static("SID=1"));
        request
    }

    fn filter() -> YoutubeContextFilter {
        YoutubeContextFilter::new()
            .with_oauth2(Arc::new(StaticOAuth {
                refresh: Mutex::new(None),
            }))
            .with_token_tracker(Arc::new(StaticVisitor))
    }

    #[tokio::test]
    async fn test_cookies_stripped_and_visitor_added() {
        let mut req = request();
        filter().on_request(&RequestContext::new(), &mut req).await;

        assert!(req.headers().get(header::COOKIE).is_none());
        assert_eq!(req.headers()[&VISITOR_ID_HEADER], "CgtWaXNpdG9y");
        assert!(req.headers().get(header::AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_bearer_only_for_oauth_clients() {
        let mut ctx = RequestContext::new();
        ctx.set_flag(OAUTH_CLIENT_ATTRIBUTE, false);

        let mut req = request();
        filter().on_request(&ctx, &mut req).await;
        assert!(req.headers().get(header::AUTHORIZATION).is_none());

        ctx.set_flag(OAUTH_CLIENT_ATTRIBUTE, true);
        let mut req = request();
        filter().on_request(&ctx, &mut req).await;
        assert_eq!(req.headers()[header::AUTHORIZATION], "Bearer abc");
    }

    #[tokio::test]
    async fn test_oauth_flag_without_handler() {
        let mut ctx = RequestContext::new();
        ctx.set_flag(OAUTH_CLIENT_ATTRIBUTE, true);

        let mut req = request();
        YoutubeContextFilter::new().on_request(&ctx, &mut req).await;
        assert!(req.headers().get(header::AUTHORIZATION).is_none());
    }
}
