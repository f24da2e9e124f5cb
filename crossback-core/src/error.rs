//! Structured error taxonomy for the backtest pipeline.
//!
//! Every stage returns a typed error to its caller. Nothing in the library
//! renders errors into user-facing text; that belongs to whoever owns the
//! outbound envelope (the CLI, a chat boundary, etc).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::DataError;

/// Errors produced by any stage of a backtest.
#[derive(Debug, Error)]
pub enum BacktestError {
    /// Fetching the price series failed (unknown ticker, provider outage, bad payload).
    #[error("data unavailable: {0}")]
    DataUnavailable(#[from] DataError),

    /// The series is too short for the requested windows, or for stable statistics.
    #[error("insufficient history: need at least {required} rows, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    /// A parameter was non-positive, non-finite, or could not be coerced to its type.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A quantity needed as a divisor was zero.
    #[error("arithmetic degeneracy: {0}")]
    ArithmeticDegeneracy(Degeneracy),
}

impl BacktestError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// The specific zero divisor behind an `ArithmeticDegeneracy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    #[error("annualized volatility is zero")]
    ZeroVolatility,

    #[error("downside deviation is zero")]
    ZeroDownsideDeviation,

    /// Portfolio value hit zero at `index`, so the return at `index + 1` is undefined.
    #[error("portfolio value is zero at row {index}")]
    ZeroPortfolioValue { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_error_converts() {
        let err: BacktestError = DataError::TickerNotFound {
            ticker: "ZZZZ".into(),
        }
        .into();
        assert!(matches!(err, BacktestError::DataUnavailable(_)));
        assert!(err.to_string().contains("ZZZZ"));
    }

    #[test]
    fn invalid_parameter_message_names_field() {
        let err = BacktestError::invalid("shareSize", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter 'shareSize': must be positive"
        );
    }

    #[test]
    fn degeneracy_serializes_snake_case() {
        let json = serde_json::to_string(&Degeneracy::ZeroVolatility).unwrap();
        assert_eq!(json, "\"zero_volatility\"");
    }
}
