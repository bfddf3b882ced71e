//! Fetch error types.

use thiserror::Error;

/// Boxed error used for opaque causes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ============================================================================
// HTTP Error
// ============================================================================

/// Error type for HTTP interface operations.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The underlying client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid proxy URI.
    #[error("Invalid proxy URI: {0}")]
    InvalidProxy(String),

    /// Response status was not acceptable.
    #[error("Invalid status code for {context}: {status}")]
    UnexpectedStatus {
        /// Status code received.
        status: u16,
        /// What the response was for.
        context: String,
    },

    /// Response had no content.
    #[error("No content in {0}")]
    NoContent(String),

    /// Redirect chain exceeded the hop limit.
    #[error("Too many redirects (limit {0})")]
    TooManyRedirects(usize),

    /// A 307/308 redirect needs the request body again but it was streamed.
    #[error("Cannot replay request body for redirect")]
    NonReplayableRedirect,

    /// The interface was cancelled while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,
}

// ============================================================================
// Client Error
// ============================================================================

/// Error type for client load operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Content is permanently unplayable (private, removed, region locked).
    ///
    /// This stops the dispatch pipeline immediately.
    #[error("{message}")]
    CannotBeLoaded {
        /// User-facing reason.
        message: String,
        /// Underlying cause.
        #[source]
        cause: Option<BoxError>,
    },

    /// HTTP error.
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Upstream answered with something the client could not understand.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Upstream wants a signed-in session.
    #[error("Login required: {0}")]
    LoginRequired(String),

    /// Rate limited by upstream.
    #[error("Rate limited by upstream")]
    RateLimited,

    /// The client does not implement this operation.
    #[error("Operation not supported by this client: {0}")]
    Unsupported(&'static str),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Anything else.
    #[error("{0}")]
    Other(#[source] BoxError),
}

impl ClientError {
    /// Creates an unrecoverable content error.
    pub fn cannot_be_loaded(message: impl Into<String>) -> Self {
        Self::CannotBeLoaded {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an unrecoverable content error with a cause.
    pub fn cannot_be_loaded_with(
        message: impl Into<String>,
        cause: impl Into<BoxError>,
    ) -> Self {
        Self::CannotBeLoaded {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    /// Returns true if the content can never be played, whichever client tries.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, Self::CannotBeLoaded { .. })
    }
}

// ============================================================================
// Client Failure
// ============================================================================

/// A client error tagged with the client that raised it.
#[derive(Debug, Error)]
#[error("Client \"{client}\" failed")]
pub struct ClientFailure {
    /// Identifier of the failing client.
    pub client: String,
    /// What went wrong.
    #[source]
    pub error: ClientError,
}

impl ClientFailure {
    /// Creates a tagged failure.
    pub fn new(client: impl Into<String>, error: ClientError) -> Self {
        Self {
            client: client.into(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_unrecoverable_classification() {
        assert!(ClientError::cannot_be_loaded("This video is private").is_unrecoverable());
        assert!(!ClientError::RateLimited.is_unrecoverable());
        assert!(!ClientError::Http(HttpError::Cancelled).is_unrecoverable());
    }

    #[test]
    fn test_failure_chain() {
        let failure = ClientFailure::new("WEB", ClientError::InvalidResponse("no player".into()));
        assert_eq!(failure.to_string(), "Client \"WEB\" failed");

        let source = failure.source().unwrap();
        assert_eq!(source.to_string(), "Invalid response: no player");
    }

    #[test]
    fn test_cannot_be_loaded_keeps_cause() {
        let io = std::io::Error::other("geo block");
        let error = ClientError::cannot_be_loaded_with("This video is not available", io);
        assert_eq!(error.to_string(), "This video is not available");
        assert_eq!(error.source().unwrap().to_string(), "geo block");
    }
}
