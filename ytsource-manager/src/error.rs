//! Resolution error types.

use thiserror::Error;
use ytsource_core::Severity;
use ytsource_fetch::{ClientFailure, DispatchError, HttpError, is_retriable_network_error};

/// User-facing message for content that no client could load.
pub const CANNOT_BE_LOADED: &str = "This video cannot be loaded.";

/// User-facing message for a `watch_videos` link that could not be followed.
pub const WATCH_VIDEOS_FAILED: &str = "Unable to process youtube watch_videos link";

/// Error type for item resolution.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Clients failed, or one reported permanently unplayable content.
    #[error("This video cannot be loaded.")]
    CannotBeLoaded(#[source] DispatchError),

    /// The `watch_videos` probe got an answer without a redirect.
    #[error("Unable to process youtube watch_videos link")]
    WatchVideosNotRedirected,

    /// The `watch_videos` probe itself failed.
    #[error("Unable to process youtube watch_videos link")]
    WatchVideosProbe(#[source] HttpError),

    /// The identifier looked like a URL but could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Redirects kept producing more links to follow.
    #[error("Too many reroutes (limit {0})")]
    TooManyReroutes(usize),

    /// The transport could not be set up.
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),
}

impl LoadError {
    /// Returns how the failure should be presented to users.
    pub fn severity(&self) -> Severity {
        match self {
            Self::CannotBeLoaded(_)
            | Self::WatchVideosNotRedirected
            | Self::WatchVideosProbe(_)
            | Self::TooManyReroutes(_) => Severity::Suspicious,
            Self::InvalidUrl(_) => Severity::Common,
            Self::Transport(_) => Severity::Fault,
        }
    }

    /// Returns true if one more attempt may succeed.
    ///
    /// Unplayable content is never retried. Otherwise the causal chain must
    /// contain a transient network fault.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::CannotBeLoaded(cause) => {
                !cause.is_unrecoverable() && is_retriable_network_error(cause)
            }
            Self::WatchVideosProbe(cause) => is_retriable_network_error(cause),
            _ => false,
        }
    }

    /// Returns true if the content can never be played.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::CannotBeLoaded(cause) if cause.is_unrecoverable())
    }

    /// Returns the dispatch failure, if this came from the clients.
    pub fn dispatch_error(&self) -> Option<&DispatchError> {
        match self {
            Self::CannotBeLoaded(cause) => Some(cause),
            _ => None,
        }
    }

    /// Returns earlier client failures kept as secondary context.
    pub fn suppressed(&self) -> &[ClientFailure] {
        match self.dispatch_error() {
            Some(cause) => cause.suppressed(),
            None => &[],
        }
    }
}

impl From<DispatchError> for LoadError {
    fn from(error: DispatchError) -> Self {
        Self::CannotBeLoaded(error)
    }
}
