//! Read-through cache that fills gaps in persisted series data.

use std::fmt;

use tracing::debug;

use crate::error::{Result, StashError};
use crate::event::{CacheEvent, EventObserver};
use crate::provider::Provider;
use crate::ranges::{DEFAULT_MIN_GAP_DAYS, Interval, missing_ranges};
use crate::store::Store;
use crate::types::{IntoDay, Key, RecordSet};

/// Read-through cache for per-key, date-ordered records.
///
/// Each [`load`](Self::load) reads what the store already holds for the
/// key, fetches only the missing sub-ranges from the provider, persists
/// the merged union, and returns the slice covering the requested range.
/// The store keeps the union of everything ever fetched for the key, so
/// later requests re-download as little as possible.
///
/// # Example
///
/// ```rust,ignore
/// use stockstash_core::{Key, TimeSeriesCache};
///
/// let cache = TimeSeriesCache::new(store, provider);
/// let records = cache
///     .load(&Key::new("AAPL"), "2025-06-01", "2025-08-29")
///     .await?;
/// ```
pub struct TimeSeriesCache<S, P> {
    store: S,
    provider: P,
    min_gap_days: i64,
    observer: Option<EventObserver>,
}

impl<S, P: Provider> fmt::Debug for TimeSeriesCache<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeSeriesCache")
            .field("provider", &self.provider.name())
            .field("min_gap_days", &self.min_gap_days)
            .field("observer", &self.observer.as_ref().map(|_| "configured"))
            .finish()
    }
}

impl<S: Store, P: Provider> TimeSeriesCache<S, P> {
    /// Creates a cache bound to `store` and `provider`.
    ///
    /// The minimum gap width defaults to
    /// [`DEFAULT_MIN_GAP_DAYS`](crate::ranges::DEFAULT_MIN_GAP_DAYS).
    #[must_use]
    pub fn new(store: S, provider: P) -> Self {
        Self {
            store,
            provider,
            min_gap_days: DEFAULT_MIN_GAP_DAYS,
            observer: None,
        }
    }

    /// Overrides the minimum gap width, in days.
    ///
    /// Gaps narrower than this are treated as ordinary non-trading days
    /// and never fetched. Callers that need exact single-day freshness
    /// should pass 1. Must be at least 1.
    #[must_use]
    pub fn with_min_gap_days(mut self, days: i64) -> Self {
        self.min_gap_days = days;
        self
    }

    /// Installs an observer invoked for every [`CacheEvent`] during a load.
    #[must_use]
    pub fn with_observer(mut self, observer: impl Fn(&CacheEvent) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    fn emit(&self, event: CacheEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Loads records for `key` covering `[start, end]`, both inclusive.
    ///
    /// Accepts date-like inputs (dates, datetimes, or ISO strings); any
    /// time-of-day component is discarded. Missing sub-ranges at least
    /// `min_gap_days` wide are fetched from the provider in ascending
    /// order, the merged union is persisted if anything new arrived, and
    /// the slice within `[start, end]` is returned. A request already
    /// covered by the store performs no fetch and no write.
    ///
    /// # Errors
    ///
    /// Returns [`StashError::InvalidRange`] if `start > end`, and
    /// propagates store and provider failures unmodified. A provider
    /// failure aborts the whole call before anything is persisted.
    pub async fn load(
        &self,
        key: &Key,
        start: impl IntoDay,
        end: impl IntoDay,
    ) -> Result<RecordSet> {
        let start = start.into_day()?;
        let end = end.into_day()?;
        if start > end {
            return Err(StashError::InvalidRange { start, end });
        }

        let existing = if self.store.exists(key).await? {
            self.store.read(key).await?
        } else {
            RecordSet::new()
        };

        if existing.is_empty() {
            debug!(key = %key, %start, %end, "cache miss, downloading full range");
            self.emit(CacheEvent::Miss { key: key.clone() });

            let span = Interval::new(start, end);
            let fetched = self.provider.fetch(key, start, end).await?;
            debug!(key = %key, rows = fetched.len(), "downloaded full range");
            self.emit(CacheEvent::Fetched {
                key: key.clone(),
                span,
                rows: fetched.len(),
            });

            self.store.write(key, &fetched).await?;
            self.emit(CacheEvent::Persisted {
                key: key.clone(),
                rows: fetched.len(),
            });
            return Ok(fetched);
        }

        debug!(key = %key, rows = existing.len(), "cache hit, loaded existing records");
        self.emit(CacheEvent::Hit {
            key: key.clone(),
            rows: existing.len(),
        });

        let gaps = missing_ranges(&existing.dates(), start, end, self.min_gap_days);
        debug!(key = %key, gaps = gaps.len(), "computed missing ranges");

        let mut working = existing;
        let mut downloaded = 0usize;
        for gap in gaps {
            debug!(key = %key, %gap, "downloading missing range");
            self.emit(CacheEvent::GapDetected {
                key: key.clone(),
                gap,
            });

            let fetched = self.provider.fetch(key, gap.start, gap.end).await?;
            self.emit(CacheEvent::Fetched {
                key: key.clone(),
                span: gap,
                rows: fetched.len(),
            });

            if fetched.is_empty() {
                debug!(key = %key, %gap, "no data available for range");
                continue;
            }
            debug!(key = %key, %gap, rows = fetched.len(), "downloaded records for range");
            downloaded += fetched.len();
            working = working.merge(fetched);
        }

        let merged = working.canonicalize();

        if downloaded > 0 {
            self.store.write(key, &merged).await?;
            debug!(key = %key, rows = merged.len(), "saved merged records");
            self.emit(CacheEvent::Persisted {
                key: key.clone(),
                rows: merged.len(),
            });
        }

        let result = merged.slice(start, end);
        debug!(
            key = %key,
            returned = result.len(),
            downloaded,
            "returning records for requested range"
        );
        Ok(result)
    }
}
