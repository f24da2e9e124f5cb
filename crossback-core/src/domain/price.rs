//! Daily price points and the validated, date-ordered series built from them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::DataError;

/// One daily OHLCV bar for a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PricePoint {
    /// Bar with open/high/low all equal to the close. Handy for close-only data.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
        }
    }
}

/// Historical daily prices for one ticker, ascending by date.
///
/// Only constructible through [`PriceSeries::new`], which enforces strictly
/// ascending dates and finite, positive closes. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, DataError> {
        let ticker = ticker.into();

        for (i, p) in points.iter().enumerate() {
            if !p.close.is_finite() || p.close <= 0.0 {
                return Err(DataError::Validation(format!(
                    "{ticker}: close at {} is not a positive finite number ({})",
                    p.date, p.close
                )));
            }
            if i > 0 && points[i - 1].date >= p.date {
                return Err(DataError::Validation(format!(
                    "{ticker}: dates not strictly ascending at {} (previous {})",
                    p.date,
                    points[i - 1].date
                )));
            }
        }

        Ok(Self { ticker, points })
    }

    /// Build a close-only series on consecutive calendar days from `start`.
    pub fn from_closes(
        ticker: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, DataError> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::from_close(start + chrono::Duration::days(i as i64), c))
            .collect();
        Self::new(ticker, points)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.close)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// BLAKE3 hash over the ticker, dates, and closes.
    pub fn dataset_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.ticker.as_bytes());
        for p in &self.points {
            hasher.update(p.date.to_string().as_bytes());
            hasher.update(&p.close.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}
