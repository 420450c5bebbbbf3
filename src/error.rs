//! Error types for Habit Heat

use thiserror::Error;

/// Errors that can occur at the boundary of the engine.
///
/// The aggregation functions themselves are total over typed input; these
/// errors come from parsing store records, date keys, ranges and configuration.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("Invalid date key (expected YYYY-MM-DD): {0}")]
    InvalidDateKey(String),

    #[error("Failed to parse store records: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
