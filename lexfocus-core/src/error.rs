//! Error types for lexfocus-core

use thiserror::Error;

/// Main error type for the lexfocus-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Key-value storage error
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error for the statistics blob
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Calendar arithmetic produced an invalid date
    #[error("invalid date: {0}")]
    Time(String),
}

/// Result type alias for lexfocus-core
pub type Result<T> = std::result::Result<T, Error>;
