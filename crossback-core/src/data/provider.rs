//! Price series provider trait and structured error types.
//!
//! The `PriceSeriesProvider` trait abstracts over data sources (Yahoo Finance,
//! synthetic) so the pipeline can swap implementations and mock for tests.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::domain::PriceSeries;

/// Structured error types for data operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// The provider definitively does not know this ticker. Never retried.
    #[error("ticker not found: {ticker}")]
    TickerNotFound { ticker: String },

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("validation error: {0}")]
    Validation(String),
}

impl DataError {
    /// Whether another attempt might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DataError::ProviderUnavailable(_) | DataError::RateLimited { .. }
        )
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    Synthetic,
    Fixture,
}

/// Timeout and retry budget for a network fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (1-based): base * 2^(attempt-1).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        self.base_delay * 2u32.saturating_pow(attempt - 1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

/// Source of ordered daily price history for a ticker.
///
/// Implementations handle the specifics of one data source. They return a
/// fully validated `PriceSeries` or a typed error, never a partial series.
pub trait PriceSeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Provenance tag recorded on results.
    fn source(&self) -> DataSource;

    /// Fetch the full available daily history for `ticker`.
    fn fetch_history(&self, ticker: &str) -> Result<PriceSeries, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }
}
