//! Returns calculator: daily and compounded cumulative returns of the
//! portfolio-value path.
//!
//! A zero portfolio value makes the next daily return undefined and poisons
//! the cumulative chain from that row on. `ReturnsCalculator::calculate`
//! refuses such a path with `ArithmeticDegeneracy` instead of handing a
//! corrupted table downstream.

use crate::domain::{PositionRow, ReturnsRow};
use crate::error::{BacktestError, Degeneracy};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReturnsCalculator;

impl ReturnsCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Returns table for a ledger, or the row where the portfolio hit zero.
    pub fn calculate(&self, ledger: &[PositionRow]) -> Result<Vec<ReturnsRow>, BacktestError> {
        let values: Vec<f64> = ledger.iter().map(|r| r.portfolio_value).collect();
        if let Some(index) = values
            .iter()
            .take(values.len().saturating_sub(1))
            .position(|&v| v == 0.0)
        {
            return Err(BacktestError::ArithmeticDegeneracy(
                Degeneracy::ZeroPortfolioValue { index },
            ));
        }
        Ok(returns_path(&values))
    }
}

/// Daily and cumulative returns over a value path, with zero-value poisoning.
///
/// Row 0 has no daily return and a cumulative return of 0. A zero value at
/// row `t - 1` leaves `daily_return[t]` undefined and every cumulative value
/// from `t` on undefined.
pub fn returns_path(values: &[f64]) -> Vec<ReturnsRow> {
    let mut rows = Vec::with_capacity(values.len());
    let mut growth = Some(1.0_f64);

    for (t, &value) in values.iter().enumerate() {
        if t == 0 {
            rows.push(ReturnsRow {
                daily_return: None,
                cumulative_return: Some(0.0),
            });
            continue;
        }

        let prev = values[t - 1];
        let daily = if prev == 0.0 {
            None
        } else {
            Some((value - prev) / prev)
        };

        growth = match (growth, daily) {
            (Some(g), Some(r)) => Some(g * (1.0 + r)),
            _ => None,
        };

        rows.push(ReturnsRow {
            daily_return: daily,
            cumulative_return: growth.map(|g| g - 1.0),
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(values: &[f64]) -> Vec<PositionRow> {
        values
            .iter()
            .map(|&v| PositionRow {
                position_shares: 0,
                position_delta: 0,
                holdings_value: 0.0,
                cash_balance: v,
                portfolio_value: v,
            })
            .collect()
    }

    #[test]
    fn daily_and_cumulative() {
        let rows = ReturnsCalculator::new()
            .calculate(&ledger(&[100.0, 110.0, 99.0]))
            .unwrap();
        assert_eq!(rows[0].daily_return, None);
        assert_eq!(rows[0].cumulative_return, Some(0.0));
        assert!((rows[1].daily_return.unwrap() - 0.1).abs() < 1e-12);
        assert!((rows[2].daily_return.unwrap() - (-0.1)).abs() < 1e-12);
        assert!((rows[2].cumulative_return.unwrap() - (-0.01)).abs() < 1e-12);
    }

    #[test]
    fn constant_path_has_zero_returns() {
        let rows = returns_path(&[50.0; 5]);
        assert!(rows[1..].iter().all(|r| r.daily_return == Some(0.0)));
        assert!(rows.iter().all(|r| r.cumulative_return == Some(0.0)));
    }

    #[test]
    fn zero_value_poisons_forward() {
        let rows = returns_path(&[100.0, 0.0, 50.0, 60.0]);
        assert_eq!(rows[1].daily_return, Some(-1.0));
        assert_eq!(rows[1].cumulative_return, Some(-1.0));
        assert_eq!(rows[2].daily_return, None);
        assert_eq!(rows[2].cumulative_return, None);
        // Later daily returns are defined again, the cumulative chain is not.
        assert_eq!(rows[3].daily_return, Some(0.2));
        assert_eq!(rows[3].cumulative_return, None);
    }

    #[test]
    fn calculator_reports_zero_value_row() {
        let err = ReturnsCalculator::new()
            .calculate(&ledger(&[100.0, 0.0, 50.0]))
            .unwrap_err();
        assert!(matches!(
            err,
            BacktestError::ArithmeticDegeneracy(Degeneracy::ZeroPortfolioValue { index: 1 })
        ));
    }

    #[test]
    fn zero_on_last_row_is_not_degenerate() {
        // Nothing divides by the final value.
        let rows = ReturnsCalculator::new()
            .calculate(&ledger(&[100.0, 0.0]))
            .unwrap();
        assert_eq!(rows[1].cumulative_return, Some(-1.0));
    }

    #[test]
    fn empty_and_single_row() {
        assert!(returns_path(&[]).is_empty());
        let rows = returns_path(&[42.0]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].daily_return, None);
    }
}
