//! Error types for the sync command-line tool.

use thiserror::Error;

/// Errors raised before a session is opened.
#[derive(Debug, Error)]
pub enum SyncError {
    /// I/O error reading the configuration or input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A line of the input file is not a valid record.
    #[error("Invalid record on line {line}: {source}")]
    Record {
        /// One-based line number.
        line: usize,
        /// Parser error.
        source: serde_json::Error,
    },
}

/// Result type for the sync tool.
pub type Result<T> = std::result::Result<T, SyncError>;
