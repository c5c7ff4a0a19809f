//! Provider trait for fetching records from an external data source.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Key, RecordSet};

/// External data source for records over a date interval.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Yahoo Finance").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Fetches records for `key` covering at most `[start, end]`.
    ///
    /// May return fewer rows than the interval spans (e.g., non-trading
    /// days) or an empty set, but must not return rows outside
    /// `[start, end]`.
    async fn fetch(&self, key: &Key, start: NaiveDate, end: NaiveDate) -> Result<RecordSet>;
}

#[async_trait]
impl<T: Provider + ?Sized> Provider for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    async fn fetch(&self, key: &Key, start: NaiveDate, end: NaiveDate) -> Result<RecordSet> {
        (**self).fetch(key, start, end).await
    }
}
