//! Configuration loaded from environment variables.
//!
//! Every value has a default; unset, empty or unparsable variables fall back
//! to it. Binaries load a `.env` file with `dotenvy` before reading these.

use crate::services::binance::{DEFAULT_BASE_URL, KLINES_LIMIT};
use crate::signals::engine::MIN_CANDLES;
use crate::signals::thresholds::SignalThresholds;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_REFERENCE_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_QUOTE_ASSET: &str = "USDT";
pub const DEFAULT_WINDOW_HOURS: u32 = 48;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 100;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FETCH_RETRIES: usize = 2;
pub const DEFAULT_PORT: u16 = 8080;

/// Deployment environment name (`ENVIRONMENT`, default `sandbox`).
pub fn get_environment() -> String {
    non_empty_var("ENVIRONMENT").unwrap_or_else(|| "sandbox".to_string())
}

pub fn get_port() -> u16 {
    parsed_var("PORT").unwrap_or(DEFAULT_PORT)
}

/// Settings for the market-data HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub quote_asset: String,
    pub request_timeout: Duration,
    /// Extra attempts after a transient failure.
    pub fetch_retries: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            quote_asset: DEFAULT_QUOTE_ASSET.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            fetch_retries: DEFAULT_FETCH_RETRIES,
        }
    }
}

impl ExchangeConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: non_empty_var("MARKET_DATA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            quote_asset: non_empty_var("QUOTE_ASSET").unwrap_or(defaults.quote_asset),
            request_timeout: parsed_var("REQUEST_TIMEOUT_SECS")
                .filter(|secs: &u64| *secs > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            fetch_retries: parsed_var("FETCH_RETRIES").unwrap_or(defaults.fetch_retries),
        }
    }
}

/// Settings for one pass over the universe.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub reference_symbol: String,
    /// Hours of hourly candles fetched per symbol.
    pub window_hours: u32,
    /// Cap on catalog entries considered; `None` scans the full universe.
    pub max_symbols: Option<usize>,
    /// Pause each fetch slot is held for after its request completes.
    pub request_delay: Duration,
    /// Bound on concurrent outstanding candle requests.
    pub max_concurrent_requests: usize,
    pub thresholds: SignalThresholds,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reference_symbol: DEFAULT_REFERENCE_SYMBOL.to_string(),
            window_hours: DEFAULT_WINDOW_HOURS,
            max_symbols: None,
            request_delay: Duration::from_millis(DEFAULT_REQUEST_DELAY_MS),
            max_concurrent_requests: 1,
            thresholds: SignalThresholds::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let thresholds = SignalThresholds {
            long_max_delta: parsed_var("LONG_MAX_DELTA")
                .unwrap_or(defaults.thresholds.long_max_delta),
            long_min_return_pct: parsed_var("LONG_MIN_RETURN_PCT")
                .unwrap_or(defaults.thresholds.long_min_return_pct),
            short_min_delta: parsed_var("SHORT_MIN_DELTA")
                .unwrap_or(defaults.thresholds.short_min_delta),
            short_max_return_pct: parsed_var("SHORT_MAX_RETURN_PCT")
                .unwrap_or(defaults.thresholds.short_max_return_pct),
        };

        Self {
            reference_symbol: non_empty_var("REFERENCE_SYMBOL")
                .unwrap_or(defaults.reference_symbol),
            window_hours: parsed_var("WINDOW_HOURS")
                .filter(|hours: &u32| (MIN_CANDLES as u32..=KLINES_LIMIT).contains(hours))
                .unwrap_or(defaults.window_hours),
            max_symbols: parsed_var("MAX_SYMBOLS"),
            request_delay: parsed_var("REQUEST_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
            max_concurrent_requests: parsed_var::<usize>("MAX_CONCURRENT_REQUESTS")
                .unwrap_or(defaults.max_concurrent_requests)
                .max(1),
            thresholds,
        }
    }
}

/// Returns the value of an environment variable if it exists and is non-empty.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn parsed_var<T: FromStr>(name: &str) -> Option<T> {
    non_empty_var(name).and_then(|v| v.trim().parse().ok())
}
