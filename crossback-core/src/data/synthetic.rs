//! Synthetic price provider for offline runs and tests.
//!
//! Produces a deterministic random walk per ticker: the RNG seed is the BLAKE3
//! hash of the ticker, so the same ticker always yields the same series.
//! Weekends are skipped.

use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataSource, PriceSeriesProvider};
use crate::domain::{PricePoint, PriceSeries};

/// Deterministic random-walk provider.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    start: NaiveDate,
    bars: usize,
    start_price: f64,
}

impl SyntheticProvider {
    pub fn new(start: NaiveDate, bars: usize) -> Self {
        Self {
            start,
            bars,
            start_price: 100.0,
        }
    }

    pub fn with_start_price(mut self, start_price: f64) -> Self {
        self.start_price = start_price;
        self
    }

    fn generate(&self, ticker: &str) -> Vec<PricePoint> {
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut points = Vec::with_capacity(self.bars);
        let mut price = self.start_price;
        let mut current = self.start;

        while points.len() < self.bars {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += chrono::Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            points.push(PricePoint {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += chrono::Duration::days(1);
        }

        points
    }
}

impl Default for SyntheticProvider {
    /// Roughly ten years of weekdays starting 2015-01-02.
    fn default() -> Self {
        let start = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap_or_default();
        Self::new(start, 2_520)
    }
}

impl PriceSeriesProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch_history(&self, ticker: &str) -> Result<PriceSeries, DataError> {
        if !self.start_price.is_finite() || self.start_price <= 0.0 {
            return Err(DataError::Validation(format!(
                "synthetic start price must be positive, got {}",
                self.start_price
            )));
        }
        PriceSeries::new(ticker, self.generate(ticker))
    }
}
