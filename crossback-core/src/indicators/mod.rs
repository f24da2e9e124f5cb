//! Indicator implementations.
//!
//! Only the simple moving average is needed by the crossover strategy. It is
//! exposed both as a streaming accumulator and as a whole-series helper.

pub mod sma;

pub use sma::{sma, SmaAccumulator};

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
