//! Per-row outputs of the signal, ledger, and returns stages.
//!
//! Each stage emits one row per price point, index-aligned with the series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Desired exposure on a row: flat (0) or long (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Signal {
    #[default]
    Flat,
    Long,
}

impl Signal {
    pub fn is_long(self) -> bool {
        matches!(self, Signal::Long)
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }
}

impl From<Signal> for u8 {
    fn from(s: Signal) -> u8 {
        s.as_i8() as u8
    }
}

impl TryFrom<u8> for Signal {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(format!("signal must be 0 or 1, got {other}")),
        }
    }
}

/// First difference of the signal: -1 exit, 0 hold, +1 entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Transition {
    Exit,
    #[default]
    Hold,
    Entry,
}

impl Transition {
    pub fn between(prev: Signal, current: Signal) -> Self {
        match current.as_i8() - prev.as_i8() {
            1 => Transition::Entry,
            -1 => Transition::Exit,
            _ => Transition::Hold,
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            Transition::Exit => -1,
            Transition::Hold => 0,
            Transition::Entry => 1,
        }
    }
}

impl From<Transition> for i8 {
    fn from(t: Transition) -> i8 {
        t.as_i8()
    }
}

impl TryFrom<i8> for Transition {
    type Error = String;

    fn try_from(v: i8) -> Result<Self, Self::Error> {
        match v {
            -1 => Ok(Transition::Exit),
            0 => Ok(Transition::Hold),
            1 => Ok(Transition::Entry),
            other => Err(format!("entry/exit must be -1, 0 or 1, got {other}")),
        }
    }
}

/// Moving averages and signal state for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalRow {
    pub date: NaiveDate,
    pub close: f64,
    /// `None` during the short-window warm-up.
    pub sma_short: Option<f64>,
    /// `None` during the long-window warm-up.
    pub sma_long: Option<f64>,
    pub signal: Signal,
    pub entry_exit: Transition,
}

/// Share position and cash/holdings ledger for one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub position_shares: u64,
    pub position_delta: i64,
    pub holdings_value: f64,
    pub cash_balance: f64,
    pub portfolio_value: f64,
}

/// Returns for one row.
///
/// `daily_return` is `None` on the first row and after a zero portfolio value.
/// `cumulative_return` is `None` only once a zero portfolio value has poisoned
/// the compounding chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnsRow {
    pub daily_return: Option<f64>,
    pub cumulative_return: Option<f64>,
}

/// Count of (+1 entries, -1 exits) in a signal table.
pub fn count_transitions(rows: &[SignalRow]) -> (usize, usize) {
    rows.iter().fold((0, 0), |(entries, exits), r| match r.entry_exit {
        Transition::Entry => (entries + 1, exits),
        Transition::Exit => (entries, exits + 1),
        Transition::Hold => (entries, exits),
    })
}
