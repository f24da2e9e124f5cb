//! Simple Moving Average (SMA).
//!
//! Rolling mean of close prices over a lookback window, kept as a running
//! sum that adds the entering close and subtracts the leaving one.
//! Lookback: period - 1 (first valid value at index period-1).

use std::collections::VecDeque;

/// Streaming SMA state. O(1) per `push`.
#[derive(Debug, Clone)]
pub struct SmaAccumulator {
    period: usize,
    window: VecDeque<f64>,
    sum: f64,
}

impl SmaAccumulator {
    /// `period` must be >= 1; `StrategyConfig` guarantees it for strategy windows.
    pub fn new(period: usize) -> Self {
        debug_assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            sum: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Feed the next close, returning the mean once the window is full.
    pub fn push(&mut self, close: f64) -> Option<f64> {
        self.window.push_back(close);
        self.sum += close;
        if self.window.len() > self.period {
            if let Some(leaving) = self.window.pop_front() {
                self.sum -= leaving;
            }
        }
        self.current()
    }

    /// Mean of the current window, `None` until `period` closes have been seen.
    pub fn current(&self) -> Option<f64> {
        if self.window.len() == self.period {
            Some(self.sum / self.period as f64)
        } else {
            None
        }
    }
}

/// Full SMA series over `closes`, `None` for the first `period - 1` rows.
pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut acc = SmaAccumulator::new(period);
    closes.iter().map(|&c| acc.push(c)).collect()
}
