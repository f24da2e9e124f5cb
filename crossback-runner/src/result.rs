//! Backtest result: the outbound document of one run.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crossback_core::data::DataSource;
use crossback_core::domain::{PositionRow, ReturnsRow, SignalRow};
use crossback_core::StrategyConfig;

use crate::metrics::MetricsResult;

/// Current result schema version. Imports reject anything newer.
pub const SCHEMA_VERSION: u32 = 1;

/// Content hash identifying a run (configuration + dataset).
pub type RunId = String;

/// One row of the merged signal table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTableRow {
    #[serde(flatten)]
    pub signal: SignalRow,
    #[serde(flatten)]
    pub position: PositionRow,
    #[serde(flatten)]
    pub returns: ReturnsRow,
}

/// Merge the three per-row tables. They are index-aligned with the series.
pub fn merge_signal_table(
    signals: Vec<SignalRow>,
    positions: Vec<PositionRow>,
    returns: Vec<ReturnsRow>,
) -> Vec<SignalTableRow> {
    debug_assert_eq!(signals.len(), positions.len());
    debug_assert_eq!(signals.len(), returns.len());
    signals
        .into_iter()
        .zip(positions)
        .zip(returns)
        .map(|((signal, position), returns)| SignalTableRow {
            signal,
            position,
            returns,
        })
        .collect()
}

/// Complete result of a single backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub stock_ticker: String,
    pub source: DataSource,
    pub config: StrategyConfig,
    pub bar_count: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub entries: usize,
    pub exits: usize,
    pub dataset_hash: String,
    pub signal_table: Vec<SignalTableRow>,
    pub metrics: MetricsResult,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl BacktestResult {
    /// Final portfolio value, if the table is non-empty.
    pub fn final_portfolio_value(&self) -> Option<f64> {
        self.signal_table.last().map(|r| r.position.portfolio_value)
    }
}

/// Deterministic run id: BLAKE3 over every configuration field and the dataset hash.
///
/// Identical parameters on identical data give identical ids.
pub fn run_id(config: &StrategyConfig, dataset_hash: &str) -> RunId {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&(config.short_window() as u64).to_le_bytes());
    hasher.update(&(config.long_window() as u64).to_le_bytes());
    hasher.update(&config.initial_capital().to_le_bytes());
    hasher.update(&config.share_size().to_le_bytes());
    hasher.update(&[config.warmup() as u8]);
    hasher.update(dataset_hash.as_bytes());
    hasher.finalize().to_hex().to_string()
}
