#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockstash/stockstash-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Store implementations for the stockstash time-series cache.
//!
//! This crate provides implementations of the [`Store`] trait from
//! `stockstash-core`:
//!
//! - [`SqliteStore`] - Persistent SQLite-backed store (default, requires `sqlite` feature)
//! - [`ParquetStore`] - One parquet file per key (requires `parquet` feature)
//! - [`MemoryStore`] - Simple in-memory store for testing

/// In-memory store implementation.
pub mod memory;

/// Parquet-file store implementation.
#[cfg(feature = "parquet")]
pub mod parquet;

/// SQLite-backed store implementation.
#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the trait for convenience
pub use stockstash_core::Store;

// Re-export implementations
pub use memory::MemoryStore;

#[cfg(feature = "parquet")]
pub use parquet::ParquetStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
