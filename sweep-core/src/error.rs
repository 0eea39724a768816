//! Error types for gha-sweep

use thiserror::Error;

/// Result type alias for sweep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sweep operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Git subprocess failure, carrying the command's stderr
    #[error("git {operation} failed: {detail}")]
    Git {
        operation: &'static str,
        detail: String,
    },

    /// Index inspection error
    #[error("git index error: {0}")]
    Index(#[from] git2::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
