//! Structured decision events emitted during a cache load.

use crate::ranges::Interval;
use crate::types::Key;

/// A decision taken during [`TimeSeriesCache::load`](crate::cache::TimeSeriesCache::load).
///
/// Events let callers observe hit/miss/fetch behavior directly, without
/// capturing log output. Install an observer with
/// [`TimeSeriesCache::with_observer`](crate::cache::TimeSeriesCache::with_observer).
#[derive(Clone, Debug, PartialEq)]
pub enum CacheEvent {
    /// Existing records were found for the key.
    Hit {
        /// The requested key.
        key: Key,
        /// Number of records already persisted.
        rows: usize,
    },
    /// No existing records were found; a full-range fetch follows.
    Miss {
        /// The requested key.
        key: Key,
    },
    /// A sub-range of the request is missing and wide enough to fetch.
    GapDetected {
        /// The requested key.
        key: Key,
        /// The missing sub-range.
        gap: Interval,
    },
    /// The provider returned for a fetched range.
    Fetched {
        /// The requested key.
        key: Key,
        /// The range that was fetched.
        span: Interval,
        /// Number of records returned, possibly zero.
        rows: usize,
    },
    /// The merged set was written back to the store.
    Persisted {
        /// The requested key.
        key: Key,
        /// Number of records persisted.
        rows: usize,
    },
}

/// Observer callback invoked for every [`CacheEvent`] during a load.
pub type EventObserver = Box<dyn Fn(&CacheEvent) + Send + Sync>;
