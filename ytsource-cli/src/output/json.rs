//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;
use ytsource_manager::{LoadError, Route};
use ytsource_store::SourceConfig;

// ============================================================================
// Output Types
// ============================================================================

/// Routing result for one identifier.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutput {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<Route>,
    /// URL that must be probed before the route is known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probe_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RouteOutput {
    /// Creates output for a routed identifier.
    pub fn routed(identifier: &str, route: Route) -> Self {
        Self {
            identifier: identifier.to_string(),
            route: Some(route),
            probe_url: None,
            error: None,
        }
    }

    /// Creates output for an identifier that needs a redirect probe.
    pub fn probe(identifier: &str, url: &str) -> Self {
        Self {
            identifier: identifier.to_string(),
            route: None,
            probe_url: Some(url.to_string()),
            error: None,
        }
    }

    /// Creates output for an identifier that failed to route.
    pub fn failed(identifier: &str, error: &LoadError) -> Self {
        let mut message = error.to_string();
        let mut source = std::error::Error::source(error);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            identifier: identifier.to_string(),
            route: None,
            probe_url: None,
            error: Some(message),
        }
    }

    /// Returns true if routing failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Returns a copy of the config with secrets masked.
    pub fn redacted_config(&self, config: &SourceConfig) -> SourceConfig {
        let mut config = config.clone();

        if let Some(proxy) = config.proxy.as_mut().filter(|p| p.password().is_some()) {
            let _ = proxy.set_password(Some("***"));
        }
        if config.oauth.refresh_token.is_some() {
            config.oauth.refresh_token = Some("***".to_string());
        }

        config
    }
}
