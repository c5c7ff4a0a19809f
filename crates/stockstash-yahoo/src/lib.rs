#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockstash/stockstash-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data provider.
//!
//! This crate provides a Yahoo Finance provider implementing the
//! [`Provider`] trait from `stockstash-core`.
//!
//! # Features
//!
//! - Fetch daily OHLCV history using Yahoo Finance's chart API
//! - Built-in rate limiting (1 request per second by default)
//! - Quote values carried in the record payload
//!
//! # Example
//!
//! ```no_run
//! use stockstash_yahoo::YahooProvider;
//! use stockstash_core::{Key, Provider};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> stockstash_core::Result<()> {
//! let provider = YahooProvider::new();
//! let key = Key::new("AAPL");
//! let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2025, 6, 29).unwrap();
//!
//! let records = provider.fetch(&key, start, end).await?;
//! println!("Fetched {} records", records.len());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use stockstash_core::{Key, Provider, Record, RecordSet, Result, StashError};
use tokio::time::sleep;
use tracing::debug;

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance data provider for daily history.
///
/// Implements [`Provider`], returning one record per trading day with
/// `open`, `high`, `low`, `close`, `volume`, and `adjusted_close` payload
/// fields.
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooProvider {
    /// Creates a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Creates a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting is
    /// still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Creates a new Yahoo Finance provider with custom rate limiting.
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            rate_limit_ms: rate_limit.as_millis() as u64,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Applies rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
            Ordering::Relaxed,
        );
    }

    /// Builds the chart API URL for a key and date range.
    fn build_chart_url(&self, key: &Key, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        format!(
            "{}/{}?period1={}&period2={}&interval=1d&includeAdjustedClose=true",
            CHART_API_URL,
            key.as_str(),
            start_ts,
            end_ts,
        )
    }

    /// Parses a Yahoo Finance chart response into records.
    fn parse_chart_response(
        &self,
        key: &Key,
        start: NaiveDate,
        end: NaiveDate,
        response: ChartResponse,
    ) -> Result<RecordSet> {
        let result = response
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| StashError::SymbolNotFound(key.to_string()))?;

        let timestamps = result.timestamp.unwrap_or_default();
        if timestamps.is_empty() {
            // Legitimately empty, e.g. a range of non-trading days.
            return Ok(RecordSet::new());
        }

        let quote = result
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| StashError::Parse("Missing quote data".to_string()))?;

        let adj_close = result
            .indicators
            .adjclose
            .and_then(|ac| ac.into_iter().next())
            .map(|ac| ac.adjclose)
            .unwrap_or_default();

        let mut records = RecordSet::new();
        for (i, &ts) in timestamps.iter().enumerate() {
            let Some(date) = Utc.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive()) else {
                continue;
            };
            // The chart API can include the bar after `end` across timezones.
            if date < start || date > end {
                continue;
            }

            let mut record = Record::new(date);
            if let Some(open) = quote.open.get(i).copied().flatten() {
                record = record.with_field("open", open);
            }
            if let Some(high) = quote.high.get(i).copied().flatten() {
                record = record.with_field("high", high);
            }
            if let Some(low) = quote.low.get(i).copied().flatten() {
                record = record.with_field("low", low);
            }
            if let Some(close) = quote.close.get(i).copied().flatten() {
                record = record.with_field("close", close);
            }
            if let Some(volume) = quote.volume.get(i).copied().flatten() {
                record = record.with_field("volume", volume);
            }
            if let Some(adj) = adj_close.get(i).copied().flatten() {
                record = record.with_field("adjusted_close", adj);
            }
            records.push(record);
        }

        Ok(records)
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance provider for daily OHLCV history"
    }

    async fn fetch(&self, key: &Key, start: NaiveDate, end: NaiveDate) -> Result<RecordSet> {
        if start > end {
            return Err(StashError::InvalidRange { start, end });
        }

        self.apply_rate_limit().await;

        let url = self.build_chart_url(key, start, end);
        debug!("Fetching history: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| StashError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(StashError::RateLimited {
                provider: "Yahoo Finance".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StashError::SymbolNotFound(key.to_string()));
        }

        if !response.status().is_success() {
            return Err(StashError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                key
            )));
        }

        let chart_response: ChartResponse = response
            .json()
            .await
            .map_err(|e| StashError::Parse(e.to_string()))?;

        // Check for API-level errors
        if let Some(error) = chart_response.chart.error {
            if error.code == "Not Found" {
                return Err(StashError::SymbolNotFound(key.to_string()));
            }
            return Err(StashError::Other(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        self.parse_chart_response(key, start, end, chart_response)
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Vec<ChartData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}
