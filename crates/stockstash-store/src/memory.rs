//! In-memory store implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use stockstash_core::{Key, RecordSet, Result, Store};
use tokio::sync::RwLock;
use tracing::debug;

/// Simple in-memory store for testing and development.
///
/// Record sets are held in an `RwLock`-protected `HashMap` and cloned on
/// read and write. Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Key, RecordSet>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn exists(&self, key: &Key) -> Result<bool> {
        Ok(self.tables.read().await.contains_key(key))
    }

    async fn read(&self, key: &Key) -> Result<RecordSet> {
        let tables = self.tables.read().await;
        match tables.get(key) {
            Some(records) => {
                debug!(key = %key, rows = records.len(), "read records");
                Ok(records.clone())
            }
            None => {
                debug!(key = %key, "no records for key");
                Ok(RecordSet::new())
            }
        }
    }

    async fn write(&self, key: &Key, records: &RecordSet) -> Result<()> {
        self.tables
            .write()
            .await
            .insert(key.clone(), records.clone());
        debug!(key = %key, rows = records.len(), "wrote records");
        Ok(())
    }
}
