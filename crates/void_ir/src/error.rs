//! Stream and source errors

use thiserror::Error;

/// Errors from reading or writing definition streams
#[derive(Debug, Error)]
pub enum StreamError {
    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be decoded
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// No stream exists at this path
    #[error("Stream not found: {0}")]
    NotFound(String),

    /// The stream ended before an object was closed
    #[error("Stream ended inside object '{object}'")]
    UnexpectedEnd {
        /// Name of the object left open
        object: String,
    },
}

/// Result type for stream operations
pub type Result<T> = std::result::Result<T, StreamError>;
