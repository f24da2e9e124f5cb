//! Strategy configuration: the immutable parameter set for one backtest.
//!
//! Parameters are validated once, at construction. Downstream stages take a
//! `&StrategyConfig` and never re-check them.

use serde::{Deserialize, Serialize};

use crate::error::BacktestError;

pub const DEFAULT_SHORT_WINDOW: usize = 20;
pub const DEFAULT_LONG_WINDOW: usize = 100;
pub const DEFAULT_INITIAL_CAPITAL: f64 = 100_000.0;
pub const DEFAULT_SHARE_SIZE: u64 = 500;

/// When the crossover comparison starts being allowed to emit a long signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// Rows before index `short_window` are flat, even when both averages exist.
    #[default]
    ShortWindowIndex,
    /// A row may go long as soon as both averages are defined.
    BothAveragesDefined,
}

impl WarmupPolicy {
    /// First row index at which the policy lets the comparison run.
    ///
    /// Both averages must still be defined; this is only the policy gate.
    pub fn first_active_index(&self, short_window: usize, long_window: usize) -> usize {
        match self {
            WarmupPolicy::ShortWindowIndex => short_window,
            WarmupPolicy::BothAveragesDefined => short_window.max(long_window) - 1,
        }
    }
}

/// Validated, immutable backtest parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StrategyConfigBuilder")]
pub struct StrategyConfig {
    short_window: usize,
    long_window: usize,
    initial_capital: f64,
    share_size: u64,
    warmup: WarmupPolicy,
}

impl StrategyConfig {
    pub fn new(
        short_window: usize,
        long_window: usize,
        initial_capital: f64,
        share_size: u64,
    ) -> Result<Self, BacktestError> {
        Self::builder()
            .short_window(short_window)
            .long_window(long_window)
            .initial_capital(initial_capital)
            .share_size(share_size)
            .build()
    }

    pub fn builder() -> StrategyConfigBuilder {
        StrategyConfigBuilder::default()
    }

    /// Builder seeded with this config's values, for deriving a variant.
    pub fn to_builder(&self) -> StrategyConfigBuilder {
        StrategyConfigBuilder {
            short_window: self.short_window,
            long_window: self.long_window,
            initial_capital: self.initial_capital,
            share_size: self.share_size,
            warmup: self.warmup,
        }
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    pub fn share_size(&self) -> u64 {
        self.share_size
    }

    pub fn warmup(&self) -> WarmupPolicy {
        self.warmup
    }

    /// Row index where the signal may first be long under this config.
    pub fn first_signal_index(&self) -> usize {
        let gate = self
            .warmup
            .first_active_index(self.short_window, self.long_window);
        let both_defined = self.short_window.max(self.long_window) - 1;
        gate.max(both_defined)
    }
}

impl Default for StrategyConfig {
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

/// Unvalidated parameter set. `build()` is the only way to a `StrategyConfig`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyConfigBuilder {
    short_window: usize,
    long_window: usize,
    initial_capital: f64,
    share_size: u64,
    warmup: WarmupPolicy,
}

impl Default for StrategyConfigBuilder {
    fn default() -> Self {
        StrategyConfig::default().to_builder()
    }
}

impl StrategyConfigBuilder {
    pub fn short_window(mut self, short_window: usize) -> Self {
        self.short_window = short_window;
        self
    }

    pub fn long_window(mut self, long_window: usize) -> Self {
        self.long_window = long_window;
        self
    }

    pub fn initial_capital(mut self, initial_capital: f64) -> Self {
        self.initial_capital = initial_capital;
        self
    }

    pub fn share_size(mut self, share_size: u64) -> Self {
        self.share_size = share_size;
        self
    }

    pub fn warmup(mut self, warmup: WarmupPolicy) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn build(self) -> Result<StrategyConfig, BacktestError> {
        if self.short_window == 0 {
            return Err(BacktestError::invalid("shortWindow", "must be positive"));
        }
        if self.long_window == 0 {
            return Err(BacktestError::invalid("longWindow", "must be positive"));
        }
        if !self.initial_capital.is_finite() {
            return Err(BacktestError::invalid("initialCapital", "must be finite"));
        }
        if self.initial_capital <= 0.0 {
            return Err(BacktestError::invalid(
                "initialCapital",
                format!("must be positive, got {}", self.initial_capital),
            ));
        }
        if self.share_size == 0 {
            return Err(BacktestError::invalid("shareSize", "must be positive"));
        }

        Ok(StrategyConfig {
            short_window: self.short_window,
            long_window: self.long_window,
            initial_capital: self.initial_capital,
            share_size: self.share_size,
            warmup: self.warmup,
        })
    }
}

impl TryFrom<StrategyConfigBuilder> for StrategyConfig {
    type Error = BacktestError;

    fn try_from(builder: StrategyConfigBuilder) -> Result<Self, Self::Error> {
        builder.build()
    }
}
