//! Runtime settings loaded from a TOML file.
//!
//! Every field has a default, so an empty file (or no file at all) is valid.
//!
//! ```toml
//! [provider]
//! timeout_secs = 30
//! max_retries = 3
//!
//! [strategy]
//! short_window = 20
//! warmup = "both_averages_defined"
//!
//! [output]
//! strict_ratios = true
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crossback_core::config::{
    DEFAULT_INITIAL_CAPITAL, DEFAULT_LONG_WINDOW, DEFAULT_SHARE_SIZE, DEFAULT_SHORT_WINDOW,
};
use crossback_core::data::yahoo::DEFAULT_BASE_URL;
use crossback_core::data::{CircuitBreaker, RetryPolicy};
use crossback_core::{BacktestError, StrategyConfig, WarmupPolicy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid strategy defaults: {0}")]
    Strategy(#[from] BacktestError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub strategy: StrategySettings,
    pub output: OutputSettings,
}

impl Settings {
    /// Load settings from `path`, or defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse settings and validate the strategy defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(text)?;
        settings.strategy_defaults()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Strategy configuration used when a request leaves a field out.
    pub fn strategy_defaults(&self) -> Result<StrategyConfig, BacktestError> {
        let s = &self.strategy;
        StrategyConfig::builder()
            .short_window(s.short_window)
            .long_window(s.long_window)
            .initial_capital(s.initial_capital)
            .share_size(s.share_size)
            .warmup(s.warmup)
            .build()
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(self.provider.timeout_secs),
            max_retries: self.provider.max_retries,
            base_delay: Duration::from_millis(self.provider.base_delay_ms),
        }
    }

    pub fn circuit_breaker(&self) -> CircuitBreaker {
        CircuitBreaker::new(Duration::from_secs(self.provider.breaker_cooldown_secs))
    }
}

/// `[provider]`: network budget for the price fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub breaker_cooldown_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
            base_delay_ms: 500,
            breaker_cooldown_secs: 30 * 60,
        }
    }
}

/// `[strategy]`: defaults for fields a request leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub short_window: usize,
    pub long_window: usize,
    pub initial_capital: f64,
    pub share_size: u64,
    pub warmup: WarmupPolicy,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            share_size: DEFAULT_SHARE_SIZE,
            warmup: WarmupPolicy::default(),
        }
    }
}

/// `[output]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Fail the run instead of reporting an undefined Sharpe/Sortino ratio.
    pub strict_ratios: bool,
}
