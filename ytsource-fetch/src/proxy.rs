//! Proxy configuration for the shared transport.
//!
//! Runs once while the [`HttpInterfaceManager`](crate::HttpInterfaceManager)
//! is being built, never per request.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::Request;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::context::RequestContext;
use crate::error::HttpError;
use crate::host::http::{HttpContextFilter, HttpInterfaceManagerBuilder};

// ============================================================================
// Proxy Settings
// ============================================================================

/// Schemes the transport can tunnel through.
pub const PROXY_SCHEMES: [&str; 2] = ["http", "https"];

/// Proxy endpoint and credentials parsed from a proxy URI.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy scheme (`http` or `https`).
    pub scheme: String,
    /// Proxy host.
    pub host: String,
    /// Proxy port.
    pub port: u16,
    /// Decoded username from the URI user info.
    pub username: Option<String>,
    /// Decoded password from the URI user info.
    pub password: Option<String>,
}

impl ProxySettings {
    /// Parses `scheme://[user:pass@]host[:port]`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidProxy`] if the scheme is not in
    /// [`PROXY_SCHEMES`], the host is missing, the port cannot be determined
    /// or the user info does not decode to UTF-8.
    pub fn from_uri(uri: &Url) -> Result<Self, HttpError> {
        if !PROXY_SCHEMES.contains(&uri.scheme()) {
            return Err(HttpError::InvalidProxy(format!(
                "unsupported scheme in {}",
                redact(uri)
            )));
        }

        let host = uri
            .host_str()
            .ok_or_else(|| HttpError::InvalidProxy(format!("no host in {}", redact(uri))))?;

        let port = uri
            .port_or_known_default()
            .ok_or_else(|| HttpError::InvalidProxy(format!("no port in {}", redact(uri))))?;

        let (username, password) = if uri.username().is_empty() {
            (None, None)
        } else {
            let username = decode_user_info(uri, uri.username())?;
            let password = decode_user_info(uri, uri.password().unwrap_or_default())?;
            (Some(username), Some(password))
        };

        Ok(Self {
            scheme: uri.scheme().to_string(),
            host: host.to_string(),
            port,
            username,
            password,
        })
    }

    /// Proxy URL without credentials.
    pub fn proxy_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }

    /// Returns true if credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some()
    }

    /// Converts into a `reqwest` proxy for all schemes.
    ///
    /// Credentials are scoped to this proxy only.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidProxy`] if `reqwest` rejects the URL.
    pub fn to_reqwest(&self) -> Result<reqwest::Proxy, HttpError> {
        let mut proxy = reqwest::Proxy::all(self.proxy_url())
            .map_err(|e| HttpError::InvalidProxy(e.to_string()))?;

        if let Some(username) = &self.username {
            proxy = proxy.basic_auth(username, self.password.as_deref().unwrap_or_default());
        }

        Ok(proxy)
    }
}

impl fmt::Display for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_credentials() {
            write!(f, "{}://***@{}:{}", self.scheme, self.host, self.port)
        } else {
            f.write_str(&self.proxy_url())
        }
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("has_credentials", &self.has_credentials())
            .finish()
    }
}

fn decode_user_info(uri: &Url, raw: &str) -> Result<String, HttpError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| HttpError::InvalidProxy(format!("user info is not UTF-8 in {}", redact(uri))))
}

fn redact(uri: &Url) -> String {
    let mut uri = uri.clone();
    if !uri.username().is_empty() {
        let _ = uri.set_username("***");
        let _ = uri.set_password(None);
    }
    uri.to_string()
}

// ============================================================================
// Proxy Handler
// ============================================================================

/// Installs proxy settings on a transport builder.
pub struct ProxyHandler;

impl ProxyHandler {
    /// Applies `proxy_uri` to the builder.
    ///
    /// An absent URI leaves the builder untouched. Otherwise the proxy and its
    /// credentials are installed, plus a filter that logs every request line.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidProxy`] if the URI cannot be used.
    pub fn init(
        builder: HttpInterfaceManagerBuilder,
        proxy_uri: Option<&Url>,
    ) -> Result<HttpInterfaceManagerBuilder, HttpError> {
        let Some(uri) = proxy_uri else {
            warn!("No proxy URI provided, skipping proxy configuration.");
            return Ok(builder);
        };

        let settings = ProxySettings::from_uri(uri)?;
        info!(proxy = %settings, "Using proxy");

        Ok(builder
            .proxy(settings)
            .filter_first(Arc::new(ProxyRequestLogger)))
    }
}

/// Logs each request line sent through the proxy.
struct ProxyRequestLogger;

#[async_trait]
impl HttpContextFilter for ProxyRequestLogger {
    async fn on_request(&self, _ctx: &RequestContext, request: &mut Request) {
        debug!(
            "Proxy client intercepted request: {} {}",
            request.method(),
            request.url()
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
