//! Crossback Runner: backtest orchestration, request handling, metrics, export.
//!
//! This crate builds on `crossback-core` to provide:
//! - Inbound request coercion (loosely typed JSON → validated config)
//! - TOML runtime settings (provider budget, strategy defaults, output)
//! - Risk metrics (annualized return/volatility, Sharpe, Sortino)
//! - The end-to-end backtest pipeline and its result document
//! - JSON/CSV/text export

pub mod config;
pub mod export;
pub mod metrics;
pub mod request;
pub mod result;
pub mod runner;

pub use config::{ConfigError, Settings};
pub use metrics::{MetricsResult, Ratio, RiskMetricsEngine};
pub use request::BacktestRequest;
pub use result::{BacktestResult, SignalTableRow, SCHEMA_VERSION};
pub use runner::{run_backtest, run_backtest_on_series, RunOptions};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn metrics_are_send_sync() {
        assert_send::<MetricsResult>();
        assert_sync::<MetricsResult>();
        assert_send::<RiskMetricsEngine>();
        assert_sync::<RiskMetricsEngine>();
    }

    #[test]
    fn request_and_settings_are_send_sync() {
        assert_send::<BacktestRequest>();
        assert_sync::<BacktestRequest>();
        assert_send::<Settings>();
        assert_sync::<Settings>();
        assert_send::<RunOptions>();
        assert_sync::<RunOptions>();
    }
}
