//! Scoped HTTP interfaces.
//!
//! An [`HttpInterfaceManager`] owns the shared `reqwest` client and the
//! filters installed at construction. Each load acquires its own
//! [`HttpInterface`], which carries a private [`RequestContext`] and a
//! cancellation token, and is released when dropped.
//!
//! The shared client never follows redirects on its own. The interface
//! follows them itself so every hop is recorded in the context.

use async_trait::async_trait;
use reqwest::{Client, Method, Request, Response, StatusCode, header, redirect};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::context::RequestContext;
use crate::error::HttpError;
use crate::proxy::ProxySettings;

/// Default total request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 16;

/// Maximum redirect hops followed by a single `execute`.
pub const MAX_REDIRECTS: usize = 10;

/// User agent string for ytsource.
const USER_AGENT: &str = concat!("ytsource/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Transport Config
// ============================================================================

/// Transport settings fixed at construction time.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User agent header.
    pub user_agent: String,
    /// Proxy URI, possibly with `user:pass` credentials.
    pub proxy: Option<Url>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
            proxy: None,
        }
    }
}

// ============================================================================
// Context Filter
// ============================================================================

/// Decorator applied to every request sent through an interface.
///
/// Filters run in installation order, once per redirect hop.
#[async_trait]
pub trait HttpContextFilter: Send + Sync {
    /// Called when a new interface is acquired.
    fn on_context_open(&self, _ctx: &mut RequestContext) {}

    /// Decorates an outgoing request.
    async fn on_request(&self, ctx: &RequestContext, request: &mut Request);

    /// Observes a response before redirect handling.
    fn on_response(&self, _ctx: &RequestContext, _url: &Url, _response: &Response) {}
}

// ============================================================================
// Manager
// ============================================================================

struct Shared {
    client: Client,
    filters: Vec<Arc<dyn HttpContextFilter>>,
}

/// Factory for scoped [`HttpInterface`]s sharing one connection pool.
///
/// Cheap to clone. Configuration is immutable once built.
#[derive(Clone)]
pub struct HttpInterfaceManager {
    shared: Arc<Shared>,
}

impl HttpInterfaceManager {
    /// Creates a builder.
    pub fn builder() -> HttpInterfaceManagerBuilder {
        HttpInterfaceManagerBuilder::new()
    }

    /// Acquires a new interface with a fresh context.
    pub fn interface(&self) -> HttpInterface {
        self.interface_with_token(&CancellationToken::new())
    }

    /// Acquires a new interface that aborts when `token` is cancelled.
    ///
    /// The interface holds a child of `token`, so releasing it never cancels
    /// the caller's token.
    pub fn interface_with_token(&self, token: &CancellationToken) -> HttpInterface {
        let mut context = RequestContext::new();
        for filter in &self.shared.filters {
            filter.on_context_open(&mut context);
        }

        trace!("HTTP interface acquired");
        HttpInterface {
            shared: Arc::clone(&self.shared),
            context,
            cancel: token.child_token(),
        }
    }

    /// Returns the number of installed filters.
    pub fn filter_count(&self) -> usize {
        self.shared.filters.len()
    }
}

impl std::fmt::Debug for HttpInterfaceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInterfaceManager")
            .field("filters", &self.shared.filters.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`HttpInterfaceManager`].
pub struct HttpInterfaceManagerBuilder {
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: String,
    proxy: Option<ProxySettings>,
    filters: Vec<Arc<dyn HttpContextFilter>>,
}

impl HttpInterfaceManagerBuilder {
    /// Creates a builder with default transport settings.
    pub fn new() -> Self {
        Self::from_config(&TransportConfig::default())
    }

    /// Creates a builder from a transport config.
    ///
    /// The proxy URI is not applied here; pass it through
    /// [`ProxyHandler::init`](crate::proxy::ProxyHandler::init).
    pub fn from_config(config: &TransportConfig) -> Self {
        Self {
            timeout: config.timeout,
            connect_timeout: config.connect_timeout,
            user_agent: config.user_agent.clone(),
            proxy: None,
            filters: Vec::new(),
        }
    }

    /// Sets the total request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Routes all traffic through a proxy.
    #[must_use]
    pub fn proxy(mut self, proxy: ProxySettings) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Appends a filter.
    #[must_use]
    pub fn filter(mut self, filter: Arc<dyn HttpContextFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Inserts a filter ahead of all others.
    #[must_use]
    pub fn filter_first(mut self, filter: Arc<dyn HttpContextFilter>) -> Self {
        self.filters.insert(0, filter);
        self
    }

    /// Builds the manager.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy is invalid or the client cannot be built.
    pub fn build(self) -> Result<HttpInterfaceManager, HttpError> {
        let mut builder = Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent(self.user_agent)
            .redirect(redirect::Policy::none());

        if let Some(proxy) = &self.proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let client = builder.build().map_err(HttpError::Build)?;

        Ok(HttpInterfaceManager {
            shared: Arc::new(Shared {
                client,
                filters: self.filters,
            }),
        })
    }
}

impl Default for HttpInterfaceManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Interface
// ============================================================================

/// A scoped HTTP execution context.
///
/// Not shared between loads. Dropping it cancels its token, which aborts any
/// request still running on a clone of that token.
pub struct HttpInterface {
    shared: Arc<Shared>,
    context: RequestContext,
    cancel: CancellationToken,
}

impl HttpInterface {
    /// Returns the request context.
    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Returns the request context for modification.
    pub fn context_mut(&mut self) -> &mut RequestContext {
        &mut self.context
    }

    /// Returns a handle that cancels this interface.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels any in-flight and future request on this interface.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true if this interface was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Builds a request with the shared client.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn request(&self, method: Method, url: &str) -> Result<Request, HttpError> {
        let url = Url::parse(url).map_err(|e| HttpError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Request::new(method, url))
    }

    /// Performs a GET request.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn get(&mut self, url: &str) -> Result<Response, HttpError> {
        let request = self.request(Method::GET, url)?;
        self.execute(request).await
    }

    /// Executes a request through the installed filters.
    ///
    /// Redirects are followed when the context allows it, up to
    /// [`MAX_REDIRECTS`] hops. Every redirect target is recorded in the
    /// context, replacing those of the previous call.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, cancellation, or a redirect
    /// chain that is too long or cannot be replayed.
    #[instrument(skip(self, request), fields(method = %request.method(), url = %request.url()))]
    pub async fn execute(&mut self, request: Request) -> Result<Response, HttpError> {
        self.context.clear_redirects();

        let mut request = request;
        let mut hops = 0;

        loop {
            let replay = request.try_clone();

            for filter in &self.shared.filters {
                filter.on_request(&self.context, &mut request).await;
            }

            let url = request.url().clone();
            let response = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return Err(HttpError::Cancelled),
                result = self.shared.client.execute(request) => result?,
            };

            debug!(status = %response.status(), "Response received");

            for filter in &self.shared.filters {
                filter.on_response(&self.context, &url, &response);
            }

            let Some(next) = redirect_target(&url, &response)? else {
                return Ok(response);
            };

            self.context.record_redirect(next.clone());

            if !self.context.follow_redirects() {
                return Ok(response);
            }

            if hops >= MAX_REDIRECTS {
                return Err(HttpError::TooManyRedirects(MAX_REDIRECTS));
            }
            hops += 1;

            debug!(location = %next, hop = hops, "Following redirect");

            request = match response.status() {
                StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => {
                    let mut replayed = replay.ok_or(HttpError::NonReplayableRedirect)?;
                    *replayed.url_mut() = next;
                    replayed
                }
                _ => Request::new(Method::GET, next),
            };
        }
    }
}

impl Drop for HttpInterface {
    fn drop(&mut self) {
        self.cancel.cancel();
        trace!("HTTP interface released");
    }
}

impl std::fmt::Debug for HttpInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpInterface")
            .field("context", &self.context)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Resolves the `Location` of a redirect response against the request URL.
fn redirect_target(url: &Url, response: &Response) -> Result<Option<Url>, HttpError> {
    if !response.status().is_redirection() {
        return Ok(None);
    }

    let Some(location) = response.location() else {
        return Ok(None);
    };

    url.join(location)
        .map(Some)
        .map_err(|e| HttpError::InvalidUrl(format!("{location}: {e}")))
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Returns the raw `Location` header.
    fn location(&self) -> Option<&str>;

    /// Fails unless the status is 2xx and the body is not known to be empty.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::UnexpectedStatus`] or [`HttpError::NoContent`].
    fn ensure_success_with_content(&self, context: &str) -> Result<(), HttpError>;
}

impl ResponseExt for Response {
    fn location(&self) -> Option<&str> {
        self.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    fn ensure_success_with_content(&self, context: &str) -> Result<(), HttpError> {
        if !self.status().is_success() {
            return Err(HttpError::UnexpectedStatus {
                status: self.status().as_u16(),
                context: context.to_string(),
            });
        }

        if self.content_length() == Some(0) {
            return Err(HttpError::NoContent(context.to_string()));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct MarkerFilter;

    #[async_trait]
    impl HttpContextFilter for MarkerFilter {
        async fn on_request(&self, _ctx: &RequestContext, request: &mut Request) {
            request
                .headers_mut()
                .insert("x-marker", HeaderValue::from_static("1"));
        }
    }

    fn manager() -> HttpInterfaceManager {
        HttpInterfaceManager::builder()
            .filter(Arc::new(MarkerFilter))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_filters_applied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .and(header_eq("x-marker", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hi"))
            .mount(&server)
            .await;

        let mut http = manager().interface();
        let response = http.get(&format!("{}/ok", server.uri())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_redirect_followed_and_recorded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/from"))
            .respond_with(ResponseTemplate::new(303).insert_header("location", "/to"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/to"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .mount(&server)
            .await;

        let mut http = manager().interface();
        let response = http.get(&format!("{}/from", server.uri())).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(http.context().redirect_locations().len(), 1);
        assert_eq!(http.context().redirect_locations()[0].path(), "/to");
    }

    #[tokio::test]
    async fn test_redirect_recorded_without_following() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/from"))
            .respond_with(
                ResponseTemplate::new(302).insert_header("location", "https://example.com/x"),
            )
            .mount(&server)
            .await;

        let mut http = manager().interface();
        http.context_mut().set_follow_redirects(false);
        let response = http.get(&format!("{}/from", server.uri())).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            http.context().redirect_locations()[0].as_str(),
            "https://example.com/x"
        );
    }

    #[tokio::test]
    async fn test_redirect_loop_capped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/loop"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/loop"))
            .mount(&server)
            .await;

        let mut http = manager().interface();
        let result = http.get(&format!("{}/loop", server.uri())).await;
        assert!(matches!(result, Err(HttpError::TooManyRedirects(MAX_REDIRECTS))));
    }

    #[tokio::test]
    async fn test_cancelled_interface() {
        let server = MockServer::start().await;
        let mut http = manager().interface();
        http.cancel();

        let result = http.get(&format!("{}/never", server.uri())).await;
        assert!(matches!(result, Err(HttpError::Cancelled)));
    }

    #[tokio::test]
    async fn test_drop_cancels_own_token_only() {
        let parent = CancellationToken::new();
        let http = manager().interface_with_token(&parent);
        let token = http.cancellation_token();
        drop(http);

        assert!(token.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn test_parent_cancellation_propagates() {
        let parent = CancellationToken::new();
        let http = manager().interface_with_token(&parent);
        parent.cancel();
        assert!(http.is_cancelled());
    }

    #[test]
    fn test_invalid_url() {
        let http = manager().interface();
        assert!(matches!(
            http.request(Method::GET, "not a url"),
            Err(HttpError::InvalidUrl(_))
        ));
    }
}
