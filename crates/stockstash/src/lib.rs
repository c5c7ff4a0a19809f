#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockstash/stockstash-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Gap-filling cache for per-key daily series data.
//!
//! This crate re-exports the core cache together with the store and
//! provider implementations selected by feature flags.
//!
//! # Features
//!
//! - `yahoo` - Yahoo Finance provider for daily OHLCV history
//! - `store-sqlite` - SQLite store backend
//! - `store-parquet` - parquet-file-per-key store backend
//!
//! # Example
//!
//! ```rust,ignore
//! use stockstash::{Key, SqliteStore, TimeSeriesCache, YahooProvider};
//!
//! #[tokio::main]
//! async fn main() -> stockstash::Result<()> {
//!     let cache = TimeSeriesCache::new(
//!         SqliteStore::new("./stash.db")?,
//!         YahooProvider::new(),
//!     );
//!
//!     let records = cache
//!         .load(&Key::new("AAPL"), "2025-06-01", "2025-08-29")
//!         .await?;
//!     println!("{} records", records.len());
//!
//!     Ok(())
//! }
//! ```

// Core types and the cache algorithm
pub use stockstash_core::*;

// Store implementations
pub use stockstash_store::MemoryStore;

#[cfg(feature = "store-parquet")]
pub use stockstash_store::ParquetStore;
#[cfg(feature = "store-sqlite")]
pub use stockstash_store::SqliteStore;

// Providers
#[cfg(feature = "yahoo")]
pub use stockstash_yahoo::YahooProvider;
