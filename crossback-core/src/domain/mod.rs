//! Domain types for crossback

pub mod price;
pub mod table;

pub use price::{PricePoint, PriceSeries};
pub use table::{count_transitions, PositionRow, ReturnsRow, Signal, SignalRow, Transition};
