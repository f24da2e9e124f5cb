//! Integration tests for signals → ledger → returns on hand-built series.
//!
//! Covers:
//! 1. Ties between the averages never open a position.
//! 2. A strictly rising series enters once and never exits.
//! 3. Series shorter than the short window: flat rows, flat ledger, error.
//! 4. Constant closes give zero returns everywhere.
//! 5. Look-ahead: truncating the series does not change earlier rows.

use chrono::NaiveDate;
use crossback_core::domain::{count_transitions, PriceSeries, Signal, Transition};
use crossback_core::{
    BacktestError, PositionSimulator, ReturnsCalculator, SignalGenerator, StrategyConfig,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn series(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_closes("TEST", NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), closes)
        .unwrap()
}

fn wave(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + (i as f64 * 0.15).sin() * 12.0 + i as f64 * 0.02)
        .collect()
}

// ──────────────────────────────────────────────
// Ties
// ──────────────────────────────────────────────

#[test]
fn equal_averages_never_open_a_position() {
    let closes = [10.0, 10.0, 10.0, 10.0, 10.0, 9.0, 9.0, 9.0, 9.0, 9.0];
    let cfg = StrategyConfig::new(2, 4, 1000.0, 100).unwrap();

    let signals = SignalGenerator::new(&cfg).generate(&series(&closes)).unwrap();
    assert!(signals.iter().all(|r| r.signal == Signal::Flat));

    let ledger = PositionSimulator::new(&cfg).simulate(&signals);
    assert!(ledger.iter().all(|r| r.position_shares == 0));
    assert_eq!(ledger.last().unwrap().portfolio_value, 1000.0);
}

// ──────────────────────────────────────────────
// Rising series
// ──────────────────────────────────────────────

#[test]
fn rising_series_has_exactly_one_entry() {
    let closes: Vec<f64> = (1..=10).map(|i| i as f64).collect();
    let cfg = StrategyConfig::new(2, 3, 1000.0, 10).unwrap();
    let signals = SignalGenerator::new(&cfg).generate(&series(&closes)).unwrap();

    let (entries, exits) = count_transitions(&signals);
    assert_eq!(entries, 1);
    assert_eq!(exits, 0);

    let first_entry = signals
        .iter()
        .position(|r| r.entry_exit == Transition::Entry)
        .unwrap();
    // smaShort first exceeds smaLong at t=2 (2.5 > 2.0).
    assert_eq!(first_entry, 2);
    assert!(signals[first_entry..].iter().all(|r| r.signal == Signal::Long));

    let ledger = PositionSimulator::new(&cfg).simulate(&signals);
    // Bought 10 @ 3, now worth 10 @ 10.
    assert_eq!(ledger.last().unwrap().portfolio_value, 1070.0);
}

// ──────────────────────────────────────────────
// Insufficient history
// ──────────────────────────────────────────────

#[test]
fn series_shorter_than_short_window() {
    let cfg = StrategyConfig::new(5, 8, 2500.0, 10).unwrap();
    let s = series(&[10.0, 11.0, 12.0, 13.0]);
    let generator = SignalGenerator::new(&cfg);

    let rows = generator.signal_rows(&s);
    assert!(rows.iter().all(|r| r.signal == Signal::Flat));

    let ledger = PositionSimulator::new(&cfg).simulate(&rows);
    assert!(ledger.iter().all(|r| r.position_shares == 0));
    assert!(ledger.iter().all(|r| r.portfolio_value == 2500.0));

    assert!(matches!(
        generator.generate(&s),
        Err(BacktestError::InsufficientHistory {
            required: 5,
            available: 4
        })
    ));
}

// ──────────────────────────────────────────────
// Constant closes
// ──────────────────────────────────────────────

#[test]
fn constant_closes_give_zero_returns() {
    let cfg = StrategyConfig::new(3, 5, 10_000.0, 50).unwrap();
    let signals = SignalGenerator::new(&cfg)
        .generate(&series(&[42.0; 40]))
        .unwrap();
    let ledger = PositionSimulator::new(&cfg).simulate(&signals);
    let returns = ReturnsCalculator::new().calculate(&ledger).unwrap();

    assert_eq!(returns[0].daily_return, None);
    assert!(returns[1..].iter().all(|r| r.daily_return == Some(0.0)));
    assert!(returns.iter().all(|r| r.cumulative_return == Some(0.0)));
}

// ──────────────────────────────────────────────
// Look-ahead
// ──────────────────────────────────────────────

#[test]
fn truncation_does_not_change_earlier_rows() {
    let closes = wave(400);
    let cfg = StrategyConfig::new(10, 30, 100_000.0, 100).unwrap();
    let generator = SignalGenerator::new(&cfg);

    let full = generator.generate(&series(&closes)).unwrap();
    let cut = generator.generate(&series(&closes[..250])).unwrap();

    assert_eq!(&full[..250], &cut[..]);
}

#[test]
fn wave_produces_entries_and_exits() {
    let cfg = StrategyConfig::new(5, 20, 100_000.0, 100).unwrap();
    let signals = SignalGenerator::new(&cfg)
        .generate(&series(&wave(500)))
        .unwrap();
    let (entries, exits) = count_transitions(&signals);
    assert!(entries >= 2, "expected several entries, got {entries}");
    assert!(exits >= 1, "expected at least one exit, got {exits}");
    assert!(entries.abs_diff(exits) <= 1);
}
