//! Backtest runner: fetch, signals, ledger, returns, metrics, result.
//!
//! The pipeline is all-or-nothing: any stage failing aborts the run with a
//! typed `BacktestError` and no partial result.

use tracing::{debug, info};

use crossback_core::data::{DataSource, PriceSeriesProvider};
use crossback_core::domain::{count_transitions, PriceSeries};
use crossback_core::{
    BacktestError, PositionSimulator, ReturnsCalculator, SignalGenerator, StrategyConfig,
};

use crate::config::Settings;
use crate::metrics::RiskMetricsEngine;
use crate::request::BacktestRequest;
use crate::result::{merge_signal_table, run_id, BacktestResult, SCHEMA_VERSION};

/// Per-run switches taken from settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Undefined Sharpe/Sortino ratios fail the run.
    pub strict_ratios: bool,
}

impl From<&Settings> for RunOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            strict_ratios: settings.output.strict_ratios,
        }
    }
}

/// Run a backtest for a validated request, fetching prices from `provider`.
pub fn run_backtest(
    request: &BacktestRequest,
    provider: &dyn PriceSeriesProvider,
    options: &RunOptions,
) -> Result<BacktestResult, BacktestError> {
    debug!(
        ticker = %request.stock_ticker,
        provider = provider.name(),
        "fetching price history"
    );
    let series = provider.fetch_history(&request.stock_ticker)?;
    run_backtest_on_series(&series, &request.config, provider.source(), options)
}

/// Run a backtest on an already-loaded series: no I/O.
pub fn run_backtest_on_series(
    series: &PriceSeries,
    config: &StrategyConfig,
    source: DataSource,
    options: &RunOptions,
) -> Result<BacktestResult, BacktestError> {
    let signals = SignalGenerator::new(config).generate(series)?;
    let (entries, exits) = count_transitions(&signals);
    debug!(bars = signals.len(), entries, exits, "signals generated");

    let positions = PositionSimulator::new(config).simulate(&signals);
    debug!(
        final_value = positions.last().map(|p| p.portfolio_value),
        "ledger simulated"
    );

    let returns = ReturnsCalculator::new().calculate(&positions)?;
    let metrics = RiskMetricsEngine::new().evaluate(&returns)?;
    if options.strict_ratios {
        metrics.require_defined()?;
    }
    debug!(
        annualized_return = metrics.annualized_return,
        annualized_volatility = metrics.annualized_volatility,
        "metrics computed"
    );

    let (Some(first_date), Some(last_date)) = (series.first_date(), series.last_date()) else {
        return Err(BacktestError::InsufficientHistory {
            required: 1,
            available: 0,
        });
    };

    let dataset_hash = series.dataset_hash();
    let result = BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id: run_id(config, &dataset_hash),
        stock_ticker: series.ticker().to_string(),
        source,
        config: config.clone(),
        bar_count: series.len(),
        first_date,
        last_date,
        entries,
        exits,
        dataset_hash,
        signal_table: merge_signal_table(signals, positions, returns),
        metrics,
    };

    info!(
        ticker = %result.stock_ticker,
        bars = result.bar_count,
        entries,
        exits,
        run_id = result.run_id.get(..12).unwrap_or_default(),
        "backtest complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossback_core::Degeneracy;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes("UNIT", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), closes)
            .unwrap()
    }

    #[test]
    fn options_follow_settings() {
        let mut settings = Settings::default();
        assert!(!RunOptions::from(&settings).strict_ratios);
        settings.output.strict_ratios = true;
        assert!(RunOptions::from(&settings).strict_ratios);
    }

    #[test]
    fn constant_series_is_lenient_by_default_and_fails_when_strict() {
        let s = series(&[50.0; 30]);
        let cfg = StrategyConfig::new(3, 5, 1_000.0, 1).unwrap();

        let ok = run_backtest_on_series(&s, &cfg, DataSource::Fixture, &RunOptions::default())
            .unwrap();
        assert_eq!(ok.metrics.sharpe_ratio.value(), None);
        assert_eq!(ok.bar_count, 30);
        assert_eq!(ok.signal_table.len(), 30);

        let strict = RunOptions {
            strict_ratios: true,
        };
        let err = run_backtest_on_series(&s, &cfg, DataSource::Fixture, &strict).unwrap_err();
        assert!(matches!(
            err,
            BacktestError::ArithmeticDegeneracy(Degeneracy::ZeroVolatility)
        ));
    }
}
