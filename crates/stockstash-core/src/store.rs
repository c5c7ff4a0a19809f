//! Store trait for durable, key-addressed record sets.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::types::{Key, RecordSet};

/// Durable key-addressed storage holding one [`RecordSet`] per key.
///
/// Implementations own the persisted layout entirely. [`write`](Self::write)
/// replaces the whole set for a key; the cache never appends through this
/// interface, and never deletes a key.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns whether any records are persisted for `key`.
    async fn exists(&self, key: &Key) -> Result<bool>;

    /// Reads the persisted records for `key`.
    ///
    /// A missing key may surface as [`StashError::StoreRead`](crate::error::StashError::StoreRead)
    /// or as an empty set; the cache checks [`exists`](Self::exists) first
    /// and treats both outcomes as "no existing coverage".
    async fn read(&self, key: &Key) -> Result<RecordSet>;

    /// Replaces the persisted records for `key` with `records`.
    async fn write(&self, key: &Key, records: &RecordSet) -> Result<()>;
}

#[async_trait]
impl<T: Store + ?Sized> Store for Arc<T> {
    async fn exists(&self, key: &Key) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn read(&self, key: &Key) -> Result<RecordSet> {
        (**self).read(key).await
    }

    async fn write(&self, key: &Key, records: &RecordSet) -> Result<()> {
        (**self).write(key, records).await
    }
}
