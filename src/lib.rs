//! Altcoin vs BTC decoupling scanner.
//!
//! Fetches USDT-margined perpetual candles, measures how each asset's
//! rolling return correlation with the reference asset has shifted, and
//! classifies LONG/SHORT candidates with take-profit and stop-loss levels.

pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use error::{FetchError, ScanError, SkipReason};
