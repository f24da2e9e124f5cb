//! Inbound requests through settings defaults to a finished run.

use crossback_core::data::SyntheticProvider;
use crossback_core::{BacktestError, WarmupPolicy};
use crossback_runner::{run_backtest, BacktestRequest, RunOptions, Settings};

const SETTINGS: &str = r#"
[strategy]
short_window = 5
long_window = 30
share_size = 10
warmup = "both_averages_defined"

[output]
strict_ratios = false
"#;

#[test]
fn chat_style_payload_runs_with_settings_defaults() {
    let settings = Settings::from_toml_str(SETTINGS).unwrap();
    let defaults = settings.strategy_defaults().unwrap();

    let body = r#"{"stockTicker": " tsla ", "initialCapital": "$50,000", "longWindow": "40"}"#;
    let req = BacktestRequest::from_json(body, &defaults).unwrap();

    assert_eq!(req.stock_ticker, "TSLA");
    assert_eq!(req.config.short_window(), 5);
    assert_eq!(req.config.long_window(), 40);
    assert_eq!(req.config.share_size(), 10);
    assert_eq!(req.config.initial_capital(), 50_000.0);
    assert_eq!(req.config.warmup(), WarmupPolicy::BothAveragesDefined);

    let result = run_backtest(
        &req,
        &SyntheticProvider::default(),
        &RunOptions::from(&settings),
    )
    .unwrap();
    assert_eq!(result.stock_ticker, "TSLA");
    assert_eq!(result.config, req.config);
}

#[test]
fn bad_payload_never_reaches_the_provider() {
    let settings = Settings::default();
    let defaults = settings.strategy_defaults().unwrap();
    let err = BacktestRequest::from_json(
        r#"{"stockTicker": "AAPL", "shortWindow": "-3"}"#,
        &defaults,
    )
    .unwrap_err();
    match err {
        BacktestError::InvalidParameter { name, reason } => {
            assert_eq!(name, "shortWindow");
            assert!(reason.contains("positive"));
        }
        other => panic!("expected InvalidParameter, got {other:?}"),
    }
}

#[test]
fn request_serializes_camel_case() {
    let req = BacktestRequest::from_json(r#"{"stockTicker":"ibm"}"#, &Default::default()).unwrap();
    let json = serde_json::to_value(&req).unwrap();
    assert_eq!(json["stockTicker"], "IBM");
    assert_eq!(json["config"]["shortWindow"], 20);
    assert_eq!(json["config"]["warmup"], "short_window_index");
}
