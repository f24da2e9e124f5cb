//! Risk metrics: reduces a returns table to annualized scalar statistics.
//!
//! Every metric is computed over the defined daily returns only (row 0 never
//! has one). Ratios whose denominator is zero are reported as
//! `Ratio::Undefined` with the reason, never as NaN or infinity.

use serde::{Deserialize, Serialize};

use crossback_core::domain::ReturnsRow;
use crossback_core::{BacktestError, Degeneracy};

/// Trading days per year used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Minimum number of defined daily returns for meaningful statistics.
pub const MIN_RETURNS: usize = 2;

/// Denominators below this are treated as zero.
const ZERO_TOLERANCE: f64 = 1e-15;

/// A ratio that is either a finite number or explicitly undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Ratio {
    Defined { value: f64 },
    Undefined { reason: Degeneracy },
}

impl Ratio {
    /// `numerator / denominator`, or `Undefined(reason)` for a zero denominator.
    pub fn quotient(numerator: f64, denominator: f64, reason: Degeneracy) -> Self {
        if denominator.abs() < ZERO_TOLERANCE {
            Ratio::Undefined { reason }
        } else {
            Ratio::Defined {
                value: numerator / denominator,
            }
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Ratio::Defined { value } => Some(*value),
            Ratio::Undefined { .. } => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Ratio::Defined { .. })
    }
}

/// Scalar evaluation of one backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsResult {
    pub annualized_return: f64,
    pub cumulative_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: Ratio,
    pub sortino_ratio: Ratio,
}

impl MetricsResult {
    /// Fail with `ArithmeticDegeneracy` if either ratio is undefined.
    pub fn require_defined(&self) -> Result<&Self, BacktestError> {
        for ratio in [self.sharpe_ratio, self.sortino_ratio] {
            if let Ratio::Undefined { reason } = ratio {
                return Err(BacktestError::ArithmeticDegeneracy(reason));
            }
        }
        Ok(self)
    }

    /// Labelled rows in the order of the classic portfolio evaluation table.
    pub fn evaluation_rows(&self) -> [(&'static str, Option<f64>); 5] {
        [
            ("Annualized Return", Some(self.annualized_return)),
            ("Cumulative Returns", Some(self.cumulative_return)),
            ("Annual Volatility", Some(self.annualized_volatility)),
            ("Sharpe Ratio", self.sharpe_ratio.value()),
            ("Sortino Ratio", self.sortino_ratio.value()),
        ]
    }
}

/// Reduces a returns table to a `MetricsResult`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RiskMetricsEngine;

impl RiskMetricsEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, returns: &[ReturnsRow]) -> Result<MetricsResult, BacktestError> {
        let daily: Vec<f64> = returns.iter().filter_map(|r| r.daily_return).collect();
        if daily.len() < MIN_RETURNS {
            return Err(BacktestError::InsufficientHistory {
                required: MIN_RETURNS,
                available: daily.len(),
            });
        }

        let cumulative_return = final_cumulative(returns)?;
        let annualized_return = annualized_return(&daily);
        let annualized_volatility = annualized_volatility(&daily);
        let downside = downside_deviation(&daily);

        Ok(MetricsResult {
            annualized_return,
            cumulative_return,
            annualized_volatility,
            sharpe_ratio: Ratio::quotient(
                annualized_return,
                annualized_volatility,
                Degeneracy::ZeroVolatility,
            ),
            sortino_ratio: Ratio::quotient(
                annualized_return,
                downside,
                Degeneracy::ZeroDownsideDeviation,
            ),
        })
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Mean daily return scaled by 252.
pub fn annualized_return(daily: &[f64]) -> f64 {
    mean_f64(daily) * TRADING_DAYS_PER_YEAR
}

/// Sample standard deviation of daily returns scaled by sqrt(252).
pub fn annualized_volatility(daily: &[f64]) -> f64 {
    std_dev(daily) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// sqrt(mean of squared losses, gains counted as zero) scaled by sqrt(252).
///
/// The mean runs over every defined return, not just the losing ones.
pub fn downside_deviation(daily: &[f64]) -> f64 {
    if daily.is_empty() {
        return 0.0;
    }
    let downside_sq: f64 = daily.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    (downside_sq / daily.len() as f64).sqrt() * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Cumulative return on the last row; a poisoned chain is a degeneracy.
fn final_cumulative(returns: &[ReturnsRow]) -> Result<f64, BacktestError> {
    if let Some(pos) = returns.iter().position(|r| r.cumulative_return.is_none()) {
        return Err(BacktestError::ArithmeticDegeneracy(
            Degeneracy::ZeroPortfolioValue {
                index: pos.saturating_sub(1),
            },
        ));
    }
    Ok(returns
        .last()
        .and_then(|r| r.cumulative_return)
        .unwrap_or(0.0))
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
