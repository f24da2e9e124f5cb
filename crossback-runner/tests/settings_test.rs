//! Settings files on disk.

use std::time::Duration;

use crossback_core::WarmupPolicy;
use crossback_runner::{ConfigError, RunOptions, Settings};

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crossback.toml");
    std::fs::write(
        &path,
        r#"
[provider]
timeout_secs = 5
base_delay_ms = 100
breaker_cooldown_secs = 60

[strategy]
long_window = 50
warmup = "both_averages_defined"

[output]
strict_ratios = true
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(&path)).unwrap();
    let policy = settings.retry_policy();
    assert_eq!(policy.timeout, Duration::from_secs(5));
    assert_eq!(policy.base_delay, Duration::from_millis(100));
    assert_eq!(policy.max_retries, 3);
    assert_eq!(
        settings.circuit_breaker().remaining_cooldown(),
        Duration::ZERO
    );

    let cfg = settings.strategy_defaults().unwrap();
    assert_eq!(cfg.short_window(), 20);
    assert_eq!(cfg.long_window(), 50);
    assert_eq!(cfg.warmup(), WarmupPolicy::BothAveragesDefined);
    assert!(RunOptions::from(&settings).strict_ratios);
}

#[test]
fn written_settings_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.toml");

    let mut settings = Settings::default();
    settings.provider.max_retries = 0;
    settings.strategy.share_size = 25;
    std::fs::write(&path, settings.to_toml_string().unwrap()).unwrap();

    assert_eq!(Settings::load(Some(&path)).unwrap(), settings);
}

#[test]
fn malformed_file_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[provider\ntimeout_secs = ").unwrap();

    assert!(matches!(
        Settings::load(Some(&path)),
        Err(ConfigError::Parse(_))
    ));
}
