//! Error types for the telemetry pipeline.
//!
//! Only I/O and structural problems are errors. Bad cells (unparseable
//! timestamps, broken vectors, failed casts) degrade to missing values.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// File missing or unreadable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited input is structurally invalid (e.g. ragged rows).
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON input is malformed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON parsed but does not have the records layout.
    #[error("Unexpected JSON layout: {0}")]
    JsonLayout(String),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    /// Pipeline configuration could not be read.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub fn json_layout(msg: impl Into<String>) -> Self {
        Error::JsonLayout(msg.into())
    }
}
