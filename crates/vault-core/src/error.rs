//! Error types for vault-core

use thiserror::Error;

/// Result type alias using vault-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vault-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Record store is not configured
    #[error("Record store is not configured: {0}")]
    NotConfigured(String),

    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Record store rejected the request
    #[error("Record store error: {0}")]
    Api(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// PIN session error
    #[error("Session error: {0}")]
    Session(String),
}
