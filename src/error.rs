//! Error types for Fixtape

use std::io;
use thiserror::Error;

/// Result type for Fixtape operations
pub type Result<T> = std::result::Result<T, FixtureError>;

/// Errors that can occur while capturing, naming or persisting fixtures
#[derive(Debug, Error)]
pub enum FixtureError {
    /// I/O error (fixture files or a request body stream)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Metadata file is not valid JSON
    #[error("Invalid fixture JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Metadata record is structurally invalid
    #[error("Invalid fixture format: {0}")]
    InvalidFormat(String),

    /// A previous drain of the request body stream failed
    #[error("Request body unavailable: stream failed while draining")]
    BodyUnavailable,

    /// Request carries nothing to derive a fixture name from
    #[error("Request cannot be identified: {0}")]
    Unidentifiable(String),

    /// Fixture file not found
    #[error("Fixture file not found: {0}")]
    FixtureNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
