//! Decoupling signal evaluation.

pub mod engine;
pub mod returns;
pub mod thresholds;

pub use engine::{SignalEngine, CORRELATION_WINDOW, MIN_CANDLES};
pub use returns::{pct_change, pearson, simple_returns};
pub use thresholds::SignalThresholds;
