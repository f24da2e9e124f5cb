//! Yahoo Finance data provider.
//!
//! Fetches the full daily OHLCV history from Yahoo's v8 chart API. Handles
//! rate limiting, retries with exponential backoff, response parsing, and the
//! circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataSource, PriceSeriesProvider, RetryPolicy};
use crate::domain::{PricePoint, PriceSeries};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Longest `Retry-After` the provider will honor before the next attempt.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Wait assumed when a 429 carries no usable `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
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
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    policy: RetryPolicy,
    base_url: String,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>, policy: RetryPolicy) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(policy.timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::ProviderUnavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            policy,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the provider at a different chart endpoint (mirrors, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the chart API URL for the full history of a ticker.
    ///
    /// The ticker is a single percent-encoded path segment, so `/`, `?` and
    /// `#` cannot reshape the request.
    fn chart_url(&self, ticker: &str) -> Result<Url, DataError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            DataError::Validation(format!("invalid chart endpoint {}: {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                DataError::Validation(format!("chart endpoint cannot take a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .push(ticker);
        url.query_pairs_mut()
            .append_pair("range", "max")
            .append_pair("interval", "1d")
            .append_pair("includeAdjustedClose", "true");
        Ok(url)
    }

    /// Parse a raw chart API body into a validated series.
    pub fn parse_chart(ticker: &str, body: &str) -> Result<PriceSeries, DataError> {
        let chart: ChartResponse = serde_json::from_str(body).map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;
        Self::parse_response(ticker, chart)
    }

    fn parse_response(ticker: &str, resp: ChartResponse) -> Result<PriceSeries, DataError> {
        let result = resp.chart.result.ok_or_else(|| {
            if let Some(err) = resp.chart.error {
                if err.code == "Not Found" {
                    DataError::TickerNotFound {
                        ticker: ticker.to_string(),
                    }
                } else {
                    DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
                }
            } else {
                DataError::ResponseFormatChanged("empty result with no error".into())
            }
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // Listed-but-empty tickers come back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Err(DataError::TickerNotFound {
                ticker: ticker.to_string(),
            });
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            // Holidays and halted sessions carry no close.
            let Some(close) = quote.close.get(i).copied().flatten() else {
                continue;
            };

            let point = PricePoint {
                date,
                open: quote.open.get(i).copied().flatten().unwrap_or(close),
                high: quote.high.get(i).copied().flatten().unwrap_or(close),
                low: quote.low.get(i).copied().flatten().unwrap_or(close),
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            };

            // Yahoo appends the live session as an extra bar on the same date.
            match points.last_mut() {
                Some(last) if last.date == date => *last = point,
                _ => points.push(point),
            }
        }

        if points.is_empty() {
            return Err(DataError::TickerNotFound {
                ticker: ticker.to_string(),
            });
        }

        PriceSeries::new(ticker, points)
    }

    /// Execute the HTTP request with retry and circuit breaker logic.
    ///
    /// The breaker gates the fetch as a whole. Failures recorded during the
    /// retries may open it for later fetches, but this one keeps its full
    /// budget and reports the last transient error.
    fn fetch_with_retry(&self, ticker: &str) -> Result<PriceSeries, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(DataError::CircuitBreakerTripped);
        }

        let url = self.chart_url(ticker)?;
        let mut last_error = None;

        for attempt in 0..=self.policy.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay(attempt, last_error.as_ref());
                warn!(ticker, attempt, delay_ms = delay.as_millis() as u64, "retrying price fetch");
                std::thread::sleep(delay);
            }

            debug!(ticker, attempt, %url, "fetching price history");

            match self.fetch_once(ticker, &url) {
                Ok(series) => {
                    self.circuit_breaker.record_success();
                    return Ok(series);
                }
                Err(e) if e.is_transient() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::ProviderUnavailable("max retries exceeded".into())))
    }

    /// Wait before `attempt`: the provider's `Retry-After` (capped) after a
    /// 429, exponential backoff otherwise.
    fn retry_delay(&self, attempt: u32, last_error: Option<&DataError>) -> Duration {
        match last_error {
            Some(DataError::RateLimited { retry_after_secs }) => {
                Duration::from_secs(*retry_after_secs).min(MAX_RETRY_AFTER)
            }
            _ => self.policy.delay_for(attempt),
        }
    }

    /// One request, with the HTTP status mapped onto a `DataError`.
    fn fetch_once(&self, ticker: &str, url: &Url) -> Result<PriceSeries, DataError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| DataError::ProviderUnavailable(e.to_string()))?;

        match resp.status() {
            StatusCode::FORBIDDEN => {
                // IP ban: immediately trip the circuit breaker
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            StatusCode::NOT_FOUND => {
                return Err(DataError::TickerNotFound {
                    ticker: ticker.to_string(),
                });
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
                return Err(DataError::RateLimited { retry_after_secs });
            }
            status if !status.is_success() => {
                return Err(DataError::ProviderUnavailable(format!(
                    "HTTP {status} for {ticker}"
                )));
            }
            _ => {}
        }

        let body = resp.text().map_err(|e| {
            DataError::ProviderUnavailable(format!("failed to read body for {ticker}: {e}"))
        })?;
        Self::parse_chart(ticker, &body)
    }
}

impl PriceSeriesProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn source(&self) -> DataSource {
        DataSource::YahooFinance
    }

    fn fetch_history(&self, ticker: &str) -> Result<PriceSeries, DataError> {
        self.fetch_with_retry(ticker)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
