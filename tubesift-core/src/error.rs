//! Core error types for `TubeSift`.

use thiserror::Error;

/// Core error type for `TubeSift` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data from a provider payload.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A record is missing its stable video identifier.
    #[error("Record has no video id: {0}")]
    MissingId(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
