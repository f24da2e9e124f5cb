//! Price history providers

pub mod circuit_breaker;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use provider::{DataError, DataSource, PriceSeriesProvider, RetryPolicy};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
