//! SQLite-backed store implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, params};
use std::path::Path;
use std::sync::Mutex;
use stockstash_core::{Key, Record, RecordSet, Result, StashError, Store};
use tracing::debug;

/// SQLite-backed store keeping one row per (key, date).
///
/// Payload fields are stored as a JSON column, so the store stays agnostic
/// to record shape. `write` replaces all rows for the key inside a single
/// transaction, matching the cache's whole-table-overwrite contract.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Creates a store backed by the SQLite database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema
    /// creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| StashError::StoreWrite(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Creates an in-memory SQLite store.
    ///
    /// Useful for testing; data is lost when the store is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StashError::StoreWrite(e.to_string()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initializes the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StashError::StoreWrite(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS series (
                key TEXT NOT NULL,
                date TEXT NOT NULL,
                payload TEXT NOT NULL,
                written_at TEXT NOT NULL,
                PRIMARY KEY (key, date)
            )",
            [],
        )
        .map_err(|e| StashError::StoreWrite(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_series_key_date
             ON series(key, date)",
            [],
        )
        .map_err(|e| StashError::StoreWrite(e.to_string()))?;

        debug!("SQLite store schema initialized");
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn exists(&self, key: &Key) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StashError::StoreRead(e.to_string()))?;

        let exists = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM series WHERE key = ?1)",
                params![key.as_str()],
                |row| row.get::<_, bool>(0),
            )
            .map_err(|e| StashError::StoreRead(e.to_string()))?;

        Ok(exists)
    }

    async fn read(&self, key: &Key) -> Result<RecordSet> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StashError::StoreRead(e.to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT date, payload FROM series
                 WHERE key = ?1
                 ORDER BY date ASC",
            )
            .map_err(|e| StashError::StoreRead(e.to_string()))?;

        let rows = stmt
            .query_map(params![key.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StashError::StoreRead(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let (date, payload) = row.map_err(|e| StashError::StoreRead(e.to_string()))?;
            let date = date
                .parse::<NaiveDate>()
                .map_err(|e| StashError::Parse(e.to_string()))?;
            let fields =
                serde_json::from_str(&payload).map_err(|e| StashError::Parse(e.to_string()))?;
            records.push(Record { date, fields });
        }

        debug!(key = %key, rows = records.len(), "read records");
        Ok(RecordSet::from_records(records))
    }

    async fn write(&self, key: &Key, records: &RecordSet) -> Result<()> {
        let written_at = Utc::now().to_rfc3339();

        let conn = self
            .conn
            .lock()
            .map_err(|e| StashError::StoreWrite(e.to_string()))?;
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| StashError::StoreWrite(e.to_string()))?;

        tx.execute("DELETE FROM series WHERE key = ?1", params![key.as_str()])
            .map_err(|e| StashError::StoreWrite(e.to_string()))?;

        for record in records.iter() {
            let payload = serde_json::to_string(&record.fields)
                .map_err(|e| StashError::Parse(e.to_string()))?;
            tx.execute(
                "INSERT OR REPLACE INTO series (key, date, payload, written_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    key.as_str(),
                    record.date.to_string(),
                    payload,
                    written_at
                ],
            )
            .map_err(|e| StashError::StoreWrite(e.to_string()))?;
        }

        tx.commit()
            .map_err(|e| StashError::StoreWrite(e.to_string()))?;
        debug!(key = %key, rows = records.len(), "wrote records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(date: &str, close: f64) -> Record {
        Record::new(date.parse::<NaiveDate>().unwrap()).with_field("close", close)
    }

    #[tokio::test]
    async fn test_missing_key_reads_empty() {
        let store = SqliteStore::in_memory().unwrap();
        let key = Key::new("AAPL");

        assert!(!store.exists(&key).await.unwrap());
        assert!(store.read(&key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read_preserves_payload() {
        let store = SqliteStore::in_memory().unwrap();
        let key = Key::new("AAPL");
        let records = RecordSet::from_records(vec![
            rec("2025-01-01", 1.0).with_field("volume", 100u64),
            rec("2025-01-02", 2.0),
        ]);

        store.write(&key, &records).await.unwrap();

        assert!(store.exists(&key).await.unwrap());
        let read = store.read(&key).await.unwrap();
        assert_eq!(read, records);
        assert_eq!(
            read.iter().next().unwrap().field("volume"),
            Some(&json!(100))
        );
    }

    #[tokio::test]
    async fn test_read_is_ordered_by_date() {
        let store = SqliteStore::in_memory().unwrap();
        let key = Key::new("AAPL");
        let records = RecordSet::from_records(vec![
            rec("2025-01-03", 3.0),
            rec("2025-01-01", 1.0),
            rec("2025-01-02", 2.0),
        ]);

        store.write(&key, &records).await.unwrap();

        let dates: Vec<String> = store
            .read(&key)
            .await
            .unwrap()
            .dates()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(dates, vec!["2025-01-01", "2025-01-02", "2025-01-03"]);
    }

    #[tokio::test]
    async fn test_write_replaces_previous_set() {
        let store = SqliteStore::in_memory().unwrap();
        let key = Key::new("AAPL");

        let first = RecordSet::from_records(vec![
            rec("2025-01-01", 1.0),
            rec("2025-01-02", 2.0),
            rec("2025-01-03", 3.0),
        ]);
        let second = RecordSet::from_records(vec![rec("2025-02-01", 4.0)]);

        store.write(&key, &first).await.unwrap();
        store.write(&key, &second).await.unwrap();

        assert_eq!(store.read(&key).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let store = SqliteStore::in_memory().unwrap();
        let aapl = Key::new("AAPL");
        let msft = Key::new("MSFT");

        store
            .write(&aapl, &RecordSet::from_records(vec![rec("2025-01-01", 1.0)]))
            .await
            .unwrap();

        assert!(!store.exists(&msft).await.unwrap());
        assert!(store.read(&msft).await.unwrap().is_empty());
        assert_eq!(store.read(&aapl).await.unwrap().len(), 1);
    }
}
