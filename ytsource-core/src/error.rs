//! Core error types for `ytsource`.

use thiserror::Error;

/// Core error type for model validation and conversion.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid data in a model.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
