//! Parquet-file store implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::PathBuf;
use stockstash_core::{Key, Record, RecordSet, Result, StashError, Store};
use tracing::debug;

/// Store writing one `<key>.parquet` file per key under a root directory.
///
/// Each file holds a `date` column and a `payload` column carrying the
/// record fields as JSON text. `write` replaces the whole file, matching
/// the cache's whole-table-overwrite contract.
#[derive(Debug)]
pub struct ParquetStore {
    root: PathBuf,
}

impl ParquetStore {
    /// Creates a store rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StashError::StoreWrite(e.to_string()))?;
        Ok(Self { root })
    }

    /// Returns the path of the parquet file backing `key`.
    #[must_use]
    pub fn path(&self, key: &Key) -> PathBuf {
        self.root.join(format!("{key}.parquet"))
    }
}

#[async_trait]
impl Store for ParquetStore {
    async fn exists(&self, key: &Key) -> Result<bool> {
        Ok(self.path(key).exists())
    }

    async fn read(&self, key: &Key) -> Result<RecordSet> {
        let file =
            File::open(self.path(key)).map_err(|e| StashError::StoreRead(e.to_string()))?;
        let df = ParquetReader::new(file)
            .finish()
            .map_err(|e| StashError::StoreRead(e.to_string()))?;

        let records = dataframe_to_records(&df)?;
        debug!(key = %key, rows = records.len(), "read records");
        Ok(records)
    }

    async fn write(&self, key: &Key, records: &RecordSet) -> Result<()> {
        let mut df = records_to_dataframe(records)?;
        let mut file =
            File::create(self.path(key)).map_err(|e| StashError::StoreWrite(e.to_string()))?;
        ParquetWriter::new(&mut file)
            .finish(&mut df)
            .map_err(|e| StashError::StoreWrite(e.to_string()))?;

        debug!(key = %key, rows = records.len(), "wrote records");
        Ok(())
    }
}

/// Builds the two-column frame persisted for a record set.
fn records_to_dataframe(records: &RecordSet) -> Result<DataFrame> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();

    let dates: Vec<i32> = records
        .iter()
        .map(|r| (r.date - epoch).num_days() as i32)
        .collect();

    let mut payloads = Vec::with_capacity(records.len());
    for record in records.iter() {
        let payload =
            serde_json::to_string(&record.fields).map_err(|e| StashError::Parse(e.to_string()))?;
        payloads.push(payload);
    }

    let date_col = Column::new("date".into(), dates)
        .cast(&DataType::Date)
        .map_err(|e| StashError::StoreWrite(e.to_string()))?;

    DataFrame::new(vec![date_col, Column::new("payload".into(), payloads)])
        .map_err(|e| StashError::StoreWrite(e.to_string()))
}

fn dataframe_to_records(df: &DataFrame) -> Result<RecordSet> {
    let dates = df
        .column("date")
        .map_err(|e| StashError::StoreRead(e.to_string()))?
        .cast(&DataType::String)
        .map_err(|e| StashError::StoreRead(e.to_string()))?;
    let dates = dates
        .str()
        .map_err(|e| StashError::StoreRead(e.to_string()))?;
    let payloads = df
        .column("payload")
        .map_err(|e| StashError::StoreRead(e.to_string()))?
        .str()
        .map_err(|e| StashError::StoreRead(e.to_string()))?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let date = dates
            .get(i)
            .ok_or_else(|| StashError::StoreRead("missing date".to_string()))?;
        let date = date
            .parse::<NaiveDate>()
            .map_err(|e| StashError::Parse(e.to_string()))?;
        let payload = payloads
            .get(i)
            .ok_or_else(|| StashError::StoreRead("missing payload".to_string()))?;
        let fields =
            serde_json::from_str(payload).map_err(|e| StashError::Parse(e.to_string()))?;
        records.push(Record { date, fields });
    }

    Ok(RecordSet::from_records(records))
}
