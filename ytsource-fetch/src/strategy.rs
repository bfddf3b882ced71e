//! Client strategy trait and types.
//!
//! A client mimics one official API surface (web, music, embedded player,
//! TV, mobile). A source manager holds several of them and tries each in
//! order until one produces a result.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use ytsource_core::AudioItem;

use crate::error::ClientError;
use crate::host::http::HttpInterface;

/// Playlist pages fetched per playlist load unless configured otherwise.
pub const DEFAULT_PLAYLIST_PAGE_COUNT: u32 = 6;

/// Result of a client load operation.
///
/// `Ok(None)` means the client found nothing and the next client may try.
pub type ClientResult = Result<Option<AudioItem>, ClientError>;

// ============================================================================
// Playlist Page Count
// ============================================================================

/// Shared, lock-free page count for clients that paginate playlists.
///
/// Writes may race with loads in flight; the last write wins.
#[derive(Debug)]
pub struct PlaylistPageCount(AtomicU32);

impl PlaylistPageCount {
    /// Creates a counter with the given value.
    pub const fn new(count: u32) -> Self {
        Self(AtomicU32::new(count))
    }

    /// Returns the current value.
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Replaces the value.
    pub fn set(&self, count: u32) {
        self.0.store(count, Ordering::Relaxed);
    }
}

impl Default for PlaylistPageCount {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYLIST_PAGE_COUNT)
    }
}

// ============================================================================
// Client Trait
// ============================================================================

/// A strategy for loading items from one upstream API surface.
///
/// Every load receives the scoped [`HttpInterface`] of the current resolution,
/// so all requests share its context attributes and cancellation.
///
/// ## Implementing a Client
///
/// ```ignore
/// struct WebClient { pages: PlaylistPageCount }
///
/// #[async_trait]
/// impl Client for WebClient {
///     fn identifier(&self) -> &str {
///         "WEB"
///     }
///
///     fn set_playlist_page_count(&self, count: u32) {
///         self.pages.set(count);
///     }
///
///     async fn load_video(&self, http: &mut HttpInterface, video_id: &str) -> ClientResult {
///         let response = http.get(&player_url(video_id)).await?;
///         // Parse the player response into a track
///     }
///
///     // load_playlist, load_search ...
/// }
/// ```
#[async_trait]
pub trait Client: Send + Sync {
    /// Stable identifier of this client (e.g. `"WEB"`, `"MUSIC"`).
    fn identifier(&self) -> &str;

    /// Whether this client is able to handle the identifier at all.
    ///
    /// Declining is not a failure; the next client is tried.
    fn can_handle_request(&self, _identifier: &str) -> bool {
        true
    }

    /// Whether requests from this client may carry an OAuth access token.
    fn supports_oauth(&self) -> bool {
        false
    }

    /// Updates how many playlist pages this client fetches.
    fn set_playlist_page_count(&self, count: u32);

    /// Loads a single video.
    async fn load_video(&self, http: &mut HttpInterface, video_id: &str) -> ClientResult;

    /// Loads a playlist, optionally marking a selected video.
    async fn load_playlist(
        &self,
        http: &mut HttpInterface,
        playlist_id: &str,
        selected_video_id: Option<&str>,
    ) -> ClientResult;

    /// Loads an auto-generated mix seeded by a video.
    async fn load_mix(
        &self,
        _http: &mut HttpInterface,
        _mix_id: &str,
        _video_id: &str,
    ) -> ClientResult {
        Err(ClientError::Unsupported("mix"))
    }

    /// Runs a search.
    async fn load_search(&self, http: &mut HttpInterface, query: &str) -> ClientResult;

    /// Runs a music search.
    async fn load_search_music(&self, _http: &mut HttpInterface, _query: &str) -> ClientResult {
        Err(ClientError::Unsupported("music search"))
    }
}

// ============================================================================
// Client Info
// ============================================================================

/// Information about a client (for reporting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client identifier.
    pub identifier: String,
    /// Whether the client accepts OAuth tokens.
    pub supports_oauth: bool,
}

impl ClientInfo {
    /// Creates client info from a client implementation.
    pub fn from_client(client: &dyn Client) -> Self {
        Self {
            identifier: client.identifier().to_string(),
            supports_oauth: client.supports_oauth(),
        }
    }
}
