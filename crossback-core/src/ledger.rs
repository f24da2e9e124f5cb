//! Position simulator: turns the signal into a share position and a
//! cash/holdings ledger.
//!
//! A long signal holds exactly `share_size` shares; entries buy the full lot
//! at the close and exits sell it. There is no leverage or margin model: cash
//! is allowed to go negative if the lot costs more than the capital.
//!
//! Accounting identity, exact on every row:
//! `portfolio_value == cash_balance + holdings_value`.

use crate::config::StrategyConfig;
use crate::domain::{PositionRow, SignalRow};

/// Fixed-lot ledger simulator bound to one strategy config.
#[derive(Debug, Clone)]
pub struct PositionSimulator {
    share_size: u64,
    initial_capital: f64,
}

impl PositionSimulator {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            share_size: config.share_size(),
            initial_capital: config.initial_capital(),
        }
    }

    /// One ledger row per signal row. Cash is a running sum, O(1) per row.
    pub fn simulate(&self, signals: &[SignalRow]) -> Vec<PositionRow> {
        let mut cash = self.initial_capital;
        let mut prev_shares: u64 = 0;

        signals
            .iter()
            .map(|row| {
                let shares = if row.signal.is_long() {
                    self.share_size
                } else {
                    0
                };
                let delta = shares as i64 - prev_shares as i64;
                if delta != 0 {
                    cash -= row.close * delta as f64;
                }
                prev_shares = shares;

                let holdings = row.close * shares as f64;
                PositionRow {
                    position_shares: shares,
                    position_delta: delta,
                    holdings_value: holdings,
                    cash_balance: cash,
                    portfolio_value: cash + holdings,
                }
            })
            .collect()
    }
}
