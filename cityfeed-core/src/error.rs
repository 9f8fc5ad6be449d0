//! Error types for the cityfeed crates.

use thiserror::Error;

/// Errors that can occur while configuring or feeding the aggregator.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Source '{name}' failed: {message}")]
    Source { name: String, message: String },

    #[error("No source candidate succeeded ({0} tried)")]
    SourcesExhausted(usize),
}

/// Result type alias for cityfeed operations.
pub type FeedResult<T> = Result<T, FeedError>;
