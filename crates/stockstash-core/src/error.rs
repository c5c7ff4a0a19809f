//! Error types for cache, store, and provider operations.
//!
//! This module defines [`StashError`] which covers all error cases that can
//! occur when loading, fetching, or persisting series data.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum StashError {
    /// The requested range has `start` after `end`.
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        /// Start of the requested range.
        start: NaiveDate,
        /// End of the requested range.
        end: NaiveDate,
    },

    /// A date-like input could not be converted to a calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The requested key was not recognized by the provider.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error parsing data from a provider or a persisted payload.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error reading from the store.
    #[error("Store read error: {0}")]
    StoreRead(String),

    /// Error writing to the store.
    #[error("Store write error: {0}")]
    StoreWrite(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

/// Result type alias using [`StashError`].
pub type Result<T> = std::result::Result<T, StashError>;
