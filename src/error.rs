//! Error types for the file access service.

use thiserror::Error;

/// Common error type for the file access service.
#[derive(Error, Debug)]
pub enum FileAccessError {
    /// The resolved path escapes the storage root.
    ///
    /// Carries the caller-supplied relative path for server-side logs only.
    /// It must never be echoed back to a client.
    #[error("path escapes storage root: {0}")]
    Confinement(String),

    /// The presented token matches neither live token.
    #[error("invalid upload token")]
    Unauthorized,

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Malformed user input (path syntax, oversized names, bad seeds).
    #[error("validation error: {0}")]
    Validation(String),

    /// Upload body exceeded the configured limit (in bytes).
    #[error("upload exceeds limit of {0} bytes")]
    PayloadTooLarge(u64),

    /// Token generation failed (no usable randomness source, bad seed).
    #[error("token error: {0}")]
    Token(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for file access operations.
pub type Result<T> = std::result::Result<T, FileAccessError>;
