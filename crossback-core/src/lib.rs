//! Crossback Core: price series, crossover signals, position ledger, returns.
//!
//! This crate contains the deterministic part of a moving-average crossover
//! backtest:
//! - Domain types (price points, validated price series, per-row tables)
//! - Validated, immutable strategy configuration
//! - Streaming SMA indicator
//! - Signal generator (short/long SMA crossover, long/flat)
//! - Fixed-lot position simulator with a cash/holdings ledger
//! - Daily and cumulative returns with zero-value poisoning
//! - Price providers (Yahoo Finance, synthetic) behind a common trait

pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod ledger;
pub mod returns;
pub mod signal;

pub use config::{StrategyConfig, StrategyConfigBuilder, WarmupPolicy};
pub use error::{BacktestError, Degeneracy};
pub use ledger::PositionSimulator;
pub use returns::ReturnsCalculator;
pub use signal::SignalGenerator;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::PriceSeries>();
        require_sync::<domain::PriceSeries>();
        require_send::<domain::SignalRow>();
        require_sync::<domain::SignalRow>();
        require_send::<domain::PositionRow>();
        require_sync::<domain::PositionRow>();
        require_send::<domain::ReturnsRow>();
        require_sync::<domain::ReturnsRow>();
        require_send::<StrategyConfig>();
        require_sync::<StrategyConfig>();
        require_send::<BacktestError>();
        require_sync::<BacktestError>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::SyntheticProvider>();
        require_sync::<data::SyntheticProvider>();
    }

    /// Architecture contract: the signal stage never sees the ledger.
    ///
    /// `SignalGenerator::generate` takes only the price series, so signals
    /// cannot depend on cash or position state.
    #[allow(dead_code)]
    fn signal_generator_takes_only_prices(generator: &SignalGenerator, series: &domain::PriceSeries) {
        let _ = generator.generate(series);
    }
}
