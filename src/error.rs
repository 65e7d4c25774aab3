//! Error types for the Falx library.
//!
//! All failures are represented by the [`FalxError`] enum. The variants keep
//! the four failure classes apart: transport failures reported by the HTTP
//! collaborator, error envelopes reported by the engine itself, response
//! bodies that match no known shape, and local policy rejections.
//!
//! # Examples
//!
//! ```
//! use falx::error::{FalxError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(FalxError::engine("no such table"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Falx operations.
#[derive(Error, Debug)]
pub enum FalxError {
    /// Network-level failure reported by the transport collaborator.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error envelope reported by the engine inside a structurally
    /// successful response body. Carries the engine's literal message.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Response body matched none of the known payload shapes.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Mutating operation requested while the client is read-only.
    /// Raised locally, before any network call.
    #[error("Read-only mode active: {0}")]
    ReadOnly(String),

    /// Invalid argument passed to a builder or client operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with FalxError.
pub type Result<T> = std::result::Result<T, FalxError>;

impl FalxError {
    /// Create a new transport error.
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        FalxError::Transport(msg.into())
    }

    /// Create a new engine error.
    pub fn engine<S: Into<String>>(msg: S) -> Self {
        FalxError::Engine(msg.into())
    }

    /// Create a new decode error.
    pub fn decode<S: Into<String>>(msg: S) -> Self {
        FalxError::Decode(msg.into())
    }

    /// Create a new read-only rejection.
    pub fn read_only<S: Into<String>>(msg: S) -> Self {
        FalxError::ReadOnly(msg.into())
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        FalxError::InvalidArgument(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        FalxError::Other(msg.into())
    }
}

impl From<reqwest::Error> for FalxError {
    fn from(err: reqwest::Error) -> Self {
        FalxError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = FalxError::engine("no such table");
        assert_eq!(error.to_string(), "Engine error: no such table");

        let error = FalxError::read_only("drop_table");
        assert_eq!(error.to_string(), "Read-only mode active: drop_table");

        let error = FalxError::decode("unrecognized payload");
        assert_eq!(error.to_string(), "Decode error: unrecognized payload");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let falx_error = FalxError::from(io_error);

        match falx_error {
            FalxError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
