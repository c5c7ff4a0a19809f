//! Core data types for cached series data.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Key`] - Identifier for one logical dataset
//! - [`Record`] - One dated observation with an opaque payload
//! - [`RecordSet`] - Ordered collection of records with merge helpers
//! - [`IntoDay`] - Conversion from date-like inputs to calendar dates

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StashError};

/// An opaque identifier for one logical dataset (e.g., a ticker symbol).
///
/// Keys are stored exactly as given; no case or whitespace normalization
/// is applied.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key(String);

impl Key {
    /// Creates a new key from a string.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One dated observation plus an opaque bag of named payload values.
///
/// Identity is the `date` field. The cache never inspects or transforms
/// the payload; it only reorders and deduplicates records by date.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Observation date.
    pub date: NaiveDate,
    /// Named payload values, serialized inline alongside the date.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    /// Creates a record for `date` with an empty payload.
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            fields: Map::new(),
        }
    }

    /// Adds a named payload value.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Returns the payload value stored under `name`, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Ordered collection of [`Record`]s for one key.
///
/// Operations that change the contents are value-returning so the merge
/// pipeline reads as a chain of pure transformations. A set produced by
/// [`canonicalize`](Self::canonicalize) is sorted ascending by date and
/// holds at most one record per date, last-written value winning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Creates an empty record set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Creates a record set from a vector of records.
    #[must_use]
    pub const fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Adds a record to the end of the set.
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an iterator over the records.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Consumes the set and returns the underlying vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<Record> {
        self.records
    }

    /// Returns the dates of all records, in storage order.
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// Returns the earliest and latest dates covered by this set.
    #[must_use]
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        if self.records.is_empty() {
            return None;
        }
        let min = self.records.iter().map(|r| r.date).min()?;
        let max = self.records.iter().map(|r| r.date).max()?;
        Some((min, max))
    }

    /// Appends all records of `other` after the records of `self`.
    ///
    /// Ordering of the result reflects concatenation order, which is what
    /// [`canonicalize`](Self::canonicalize) uses to break date ties.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.records.extend(other.records);
        self
    }

    /// Sorts ascending by date and drops duplicate dates, keeping the
    /// last occurrence.
    ///
    /// The sort is stable, so for records sharing a date the one appended
    /// later survives.
    #[must_use]
    pub fn canonicalize(self) -> Self {
        let mut records = self.records;
        records.sort_by_key(|r| r.date);

        let mut out: Vec<Record> = Vec::with_capacity(records.len());
        for record in records {
            match out.last_mut() {
                Some(last) if last.date == record.date => *last = record,
                _ => out.push(record),
            }
        }
        Self { records: out }
    }

    /// Returns the records whose dates fall within `[start, end]`,
    /// inclusive on both ends.
    #[must_use]
    pub fn slice(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|r| r.date >= start && r.date <= end)
                .cloned()
                .collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl FromIterator<Record> for RecordSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Conversion from date-like inputs into a calendar date.
///
/// Any time-of-day component is discarded; all comparisons in the cache
/// are date-granular.
pub trait IntoDay {
    /// Converts this value into a [`NaiveDate`].
    ///
    /// # Errors
    /// Returns [`StashError::InvalidDate`] if the value cannot be parsed
    /// as a date.
    fn into_day(self) -> Result<NaiveDate>;
}

impl IntoDay for NaiveDate {
    fn into_day(self) -> Result<NaiveDate> {
        Ok(self)
    }
}

impl IntoDay for NaiveDateTime {
    fn into_day(self) -> Result<NaiveDate> {
        Ok(self.date())
    }
}

impl IntoDay for DateTime<Utc> {
    fn into_day(self) -> Result<NaiveDate> {
        Ok(self.date_naive())
    }
}

impl IntoDay for &str {
    fn into_day(self) -> Result<NaiveDate> {
        if let Ok(date) = NaiveDate::from_str(self) {
            return Ok(date);
        }
        if let Ok(datetime) = DateTime::parse_from_rfc3339(self) {
            return Ok(datetime.date_naive());
        }
        Err(StashError::InvalidDate(self.to_string()))
    }
}

impl IntoDay for String {
    fn into_day(self) -> Result<NaiveDate> {
        self.as_str().into_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn rec(date: &str, close: f64) -> Record {
        Record::new(d(date)).with_field("close", close)
    }

    #[test]
    fn test_key_roundtrip() {
        let key = Key::new("brk.b");
        assert_eq!(key.as_str(), "brk.b");
        assert_eq!(key.to_string(), "brk.b");
        assert_eq!(Key::from("brk.b"), key);
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = rec("2025-01-02", 1.5).with_field("volume", 100u64);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({"date": "2025-01-02", "close": 1.5, "volume": 100})
        );

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_canonicalize_sorts_and_keeps_last() {
        let set = RecordSet::from_records(vec![
            rec("2025-01-03", 3.0),
            rec("2025-01-01", 1.0),
            rec("2025-01-02", 2.0),
            rec("2025-01-01", 9.0),
        ]);

        let canonical = set.canonicalize();
        assert_eq!(
            canonical.dates(),
            vec![d("2025-01-01"), d("2025-01-02"), d("2025-01-03")]
        );
        // The 9.0 row was appended after the 1.0 row, so it wins.
        assert_eq!(
            canonical.iter().next().unwrap().field("close"),
            Some(&json!(9.0))
        );
    }

    #[test]
    fn test_slice_is_inclusive() {
        let set = RecordSet::from_records(vec![
            rec("2025-01-01", 1.0),
            rec("2025-01-02", 2.0),
            rec("2025-01-03", 3.0),
            rec("2025-01-04", 4.0),
        ]);

        let sliced = set.slice(d("2025-01-02"), d("2025-01-03"));
        assert_eq!(sliced.dates(), vec![d("2025-01-02"), d("2025-01-03")]);
    }

    #[test]
    fn test_date_range() {
        assert_eq!(RecordSet::new().date_range(), None);

        let set = RecordSet::from_records(vec![
            rec("2025-01-05", 5.0),
            rec("2025-01-01", 1.0),
            rec("2025-01-03", 3.0),
        ]);
        assert_eq!(set.date_range(), Some((d("2025-01-01"), d("2025-01-05"))));
    }

    #[test]
    fn test_merge_preserves_append_order() {
        let left = RecordSet::from_records(vec![rec("2025-01-01", 1.0)]);
        let right = RecordSet::from_records(vec![rec("2025-01-01", 2.0)]);

        let merged = left.merge(right).canonicalize();
        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged.iter().next().unwrap().field("close"),
            Some(&json!(2.0))
        );
    }

    #[test]
    fn test_into_day_conversions() {
        assert_eq!("2025-06-01".into_day().unwrap(), d("2025-06-01"));
        assert_eq!(
            "2025-06-01T14:30:00Z".into_day().unwrap(),
            d("2025-06-01")
        );
        assert_eq!(d("2025-06-01").into_day().unwrap(), d("2025-06-01"));

        let datetime = d("2025-06-01").and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(datetime.into_day().unwrap(), d("2025-06-01"));

        assert!(matches!(
            "not-a-date".into_day(),
            Err(StashError::InvalidDate(_))
        ));
    }
}
