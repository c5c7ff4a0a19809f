#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockstash/stockstash-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and the gap-filling cache algorithm.
//!
//! This crate provides the foundational pieces of stockstash:
//!
//! - [`TimeSeriesCache`](cache::TimeSeriesCache) - Read-through cache orchestrator
//! - [`missing_ranges`](ranges::missing_ranges) - Missing-range calculator
//! - [`RecordSet`](types::RecordSet) - Ordered, deduplicated dated records
//! - [`Store`](store::Store) - Durable key-addressed storage trait
//! - [`Provider`](provider::Provider) - External data source trait
//! - [`CacheEvent`](event::CacheEvent) - Structured cache decision events

/// Cache orchestrator that fills gaps in persisted series data.
pub mod cache;
/// Error types for cache operations.
pub mod error;
/// Structured decision events and the observer callback.
pub mod event;
/// Provider trait for fetching records from an external source.
pub mod provider;
/// Interval type and missing-range calculation.
pub mod ranges;
/// Store trait for durable, key-addressed record sets.
pub mod store;
/// Core data types (Key, Record, RecordSet, date conversions).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::TimeSeriesCache;
pub use error::{Result, StashError};
pub use event::{CacheEvent, EventObserver};
pub use provider::Provider;
pub use ranges::{DEFAULT_MIN_GAP_DAYS, Interval, missing_ranges};
pub use store::Store;
pub use types::{IntoDay, Key, Record, RecordSet};
