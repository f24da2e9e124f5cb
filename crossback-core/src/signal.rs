//! Moving-average crossover signal generator.
//!
//! Produces one `SignalRow` per price point: the short and long SMAs, a binary
//! long/flat signal, and the entry/exit transition. The signal is long only
//! when the short SMA is strictly above the long SMA; ties stay flat.
//!
//! Both SMAs are streamed through `SmaAccumulator`, so a full pass is O(n).

use crate::config::StrategyConfig;
use crate::domain::{PriceSeries, Signal, SignalRow, Transition};
use crate::error::BacktestError;
use crate::indicators::SmaAccumulator;

/// Crossover signal generator bound to one strategy config.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    short_window: usize,
    long_window: usize,
    first_signal_index: usize,
}

impl SignalGenerator {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            short_window: config.short_window(),
            long_window: config.long_window(),
            first_signal_index: config.first_signal_index(),
        }
    }

    /// Signal table for `series`.
    ///
    /// Fails with `InsufficientHistory` when the series is shorter than the
    /// short window: the table would be all flat and the backtest degenerate.
    pub fn generate(&self, series: &PriceSeries) -> Result<Vec<SignalRow>, BacktestError> {
        if series.len() < self.short_window {
            return Err(BacktestError::InsufficientHistory {
                required: self.short_window,
                available: series.len(),
            });
        }
        Ok(self.signal_rows(series))
    }

    /// Signal table without the history check. Short series give all-flat rows.
    pub fn signal_rows(&self, series: &PriceSeries) -> Vec<SignalRow> {
        let mut short = SmaAccumulator::new(self.short_window);
        let mut long = SmaAccumulator::new(self.long_window);
        let mut prev = Signal::Flat;

        series
            .points()
            .iter()
            .enumerate()
            .map(|(t, p)| {
                let sma_short = short.push(p.close);
                let sma_long = long.push(p.close);

                let signal = match (sma_short, sma_long) {
                    (Some(s), Some(l)) if t >= self.first_signal_index && s > l => Signal::Long,
                    _ => Signal::Flat,
                };
                let entry_exit = if t == 0 {
                    Transition::Hold
                } else {
                    Transition::between(prev, signal)
                };
                prev = signal;

                SignalRow {
                    date: p.date,
                    close: p.close,
                    sma_short,
                    sma_long,
                    signal,
                    entry_exit,
                }
            })
            .collect()
    }
}
