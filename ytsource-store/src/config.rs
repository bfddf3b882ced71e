//! Configuration management.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;
use ytsource_fetch::{DEFAULT_PLAYLIST_PAGE_COUNT, PROXY_SCHEMES, TransportConfig};
use ytsource_manager::{SourceOptions, YoutubeSourceManager};

use crate::error::StoreError;
use crate::persistence::{default_config_path, load_json, save_json};

/// Client order used when none is configured.
pub const DEFAULT_CLIENTS: [&str; 4] = ["MUSIC", "ANDROID_VR", "WEB", "WEBEMBEDDED"];

/// Source configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceConfig {
    /// Accept search prefixes.
    pub allow_search: bool,
    /// Accept bare video ids.
    pub allow_direct_video_ids: bool,
    /// Accept bare playlist ids.
    pub allow_direct_playlist_ids: bool,
    /// Client identifiers, in dispatch order.
    ///
    /// Informational only. Clients are constructed and registered by the
    /// host, so this list records the order the host is expected to use and
    /// is never applied to a manager.
    pub clients: Vec<String>,
    /// Playlist pages fetched per playlist load.
    pub playlist_page_count: u32,
    /// Proxy URI, possibly with credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Url>,
    /// OAuth settings.
    pub oauth: OAuthConfig,
    /// HTTP settings.
    pub http: HttpConfig,
}

/// OAuth settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OAuthConfig {
    /// Whether OAuth is enabled.
    pub enabled: bool,
    /// Stored refresh token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Skip account linking when no token is stored.
    pub skip_initialization: bool,
}

/// HTTP transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Custom user agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let transport = TransportConfig::default();
        Self {
            timeout_secs: transport.timeout.as_secs(),
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            user_agent: None,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        let options = SourceOptions::default();
        Self {
            allow_search: options.allow_search,
            allow_direct_video_ids: options.allow_direct_video_ids,
            allow_direct_playlist_ids: options.allow_direct_playlist_ids,
            clients: DEFAULT_CLIENTS.iter().map(ToString::to_string).collect(),
            playlist_page_count: DEFAULT_PLAYLIST_PAGE_COUNT,
            proxy: None,
            oauth: OAuthConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl SourceConfig {
    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        default_config_path()
    }

    /// Loads configuration from the default path.
    ///
    /// # Errors
    ///
    /// See [`load_from`](Self::load_from).
    pub async fn load() -> Result<Self, StoreError> {
        Self::load_from(&Self::default_path()).await
    }

    /// Loads configuration from a specific path. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// fails validation.
    pub async fn load_from(path: &Path) -> Result<Self, StoreError> {
        let config: Self = match load_json(path).await {
            Ok(config) => config,
            Err(e) if e.is_not_found() => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };

        config.validate()?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves configuration to the default path.
    ///
    /// # Errors
    ///
    /// See [`save_to`](Self::save_to).
    pub async fn save(&self) -> Result<(), StoreError> {
        self.save_to(&Self::default_path()).await
    }

    /// Saves configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or writing fails.
    pub async fn save_to(&self, path: &Path) -> Result<(), StoreError> {
        self.validate()?;
        save_json(path, self).await?;
        info!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Checks the configuration for values the source cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<(), StoreError> {
        let mut seen = HashSet::new();
        for client in &self.clients {
            if client.trim().is_empty() {
                return Err(StoreError::Config("client identifier is empty".into()));
            }
            if !seen.insert(client.as_str()) {
                return Err(StoreError::Config(format!("client {client} is listed twice")));
            }
        }

        if self.playlist_page_count == 0 {
            return Err(StoreError::Config("playlistPageCount must be at least 1".into()));
        }

        if self.http.timeout_secs == 0 || self.http.connect_timeout_secs == 0 {
            return Err(StoreError::Config("HTTP timeouts must be at least 1 second".into()));
        }

        if let Some(proxy) = &self.proxy {
            if !PROXY_SCHEMES.contains(&proxy.scheme()) {
                return Err(StoreError::Config(format!(
                    "unsupported proxy scheme: {}",
                    proxy.scheme()
                )));
            }
            if proxy.host_str().is_none() {
                return Err(StoreError::Config("proxy URI has no host".into()));
            }
        }

        Ok(())
    }

    /// Returns the routing options.
    pub fn source_options(&self) -> SourceOptions {
        SourceOptions::new()
            .with_allow_search(self.allow_search)
            .with_allow_direct_video_ids(self.allow_direct_video_ids)
            .with_allow_direct_playlist_ids(self.allow_direct_playlist_ids)
    }

    /// Applies the runtime settings to a built manager.
    ///
    /// Sets the playlist page count on every client and, when OAuth is
    /// enabled, hands the stored refresh token to the OAuth handler.
    pub fn apply_to(&self, manager: &YoutubeSourceManager) {
        manager.set_playlist_page_count(self.playlist_page_count);

        if self.oauth.enabled {
            debug!(
                has_token = self.oauth.refresh_token.is_some(),
                skip_initialization = self.oauth.skip_initialization,
                "Enabling OAuth from configuration"
            );
            manager.use_oauth2(self.oauth.refresh_token.clone(), self.oauth.skip_initialization);
        }
    }

    /// Returns the transport settings.
    pub fn transport_config(&self) -> TransportConfig {
        let mut transport = TransportConfig {
            timeout: Duration::from_secs(self.http.timeout_secs),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_secs),
            proxy: self.proxy.clone(),
            ..TransportConfig::default()
        };
        if let Some(user_agent) = &self.http.user_agent {
            transport.user_agent.clone_from(user_agent);
        }
        transport
    }
}

// ============================================================================
// Tests
// ============================================================================
