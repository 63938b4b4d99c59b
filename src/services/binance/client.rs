//! REST client for the Binance USD-M futures market-data endpoints.

use crate::config::ExchangeConfig;
use crate::error::FetchError;
use crate::models::candle::CandleSeries;
use crate::services::binance::messages::{parse_klines, ExchangeInfo};
use crate::services::market_data::MarketDataProvider;
use backon::{ExponentialBuilder, Retryable};
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

const EXCHANGE_INFO_PATH: &str = "/fapi/v1/exchangeInfo";
const KLINES_PATH: &str = "/fapi/v1/klines";
const KLINES_INTERVAL: &str = "1h";

/// Most klines one request returns, and so the widest window in hours.
pub const KLINES_LIMIT: u32 = 1000;
const USER_AGENT: &str = concat!("altpulse/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct BinanceFuturesClient {
    base_url: String,
    client: reqwest::Client,
    quote_asset: String,
    fetch_retries: usize,
}

impl BinanceFuturesClient {
    /// Builds a client with explicit request and connect timeouts.
    pub fn new(config: &ExchangeConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .connect_timeout(config.request_timeout.min(Duration::from_secs(5)))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            quote_asset: config.quote_asset.clone(),
            fetch_retries: config.fetch_retries,
        })
    }

    /// Uses a caller-supplied `reqwest::Client` (tests, shared pools).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let defaults = ExchangeConfig::default();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            quote_asset: defaults.quote_asset,
            fetch_retries: defaults.fetch_retries,
        }
    }

    pub fn with_retries(mut self, fetch_retries: usize) -> Self {
        self.fetch_retries = fetch_retries;
        self
    }

    pub fn with_quote_asset(mut self, quote_asset: impl Into<String>) -> Self {
        self.quote_asset = quote_asset.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn exchange_info(&self) -> Result<ExchangeInfo, FetchError> {
        let body = self.get_json(EXCHANGE_INFO_PATH, &[]).await?;
        serde_json::from_value(body)
            .map_err(|e| FetchError::Malformed(format!("exchangeInfo: {}", e)))
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.fetch_retries);

        (|| self.get_json_once(path, query))
            .retry(backoff)
            .when(|e: &FetchError| e.is_retryable())
            .notify(|e: &FetchError, delay: Duration| {
                warn!(
                    path = path,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Market data request failed, retrying in {:?}",
                    delay
                );
            })
            .await
    }

    async fn get_json_once(&self, path: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| FetchError::Malformed(format!("{}: {}", path, e)))
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for BinanceFuturesClient {
    async fn list_universe(&self) -> Result<Vec<String>, FetchError> {
        let info = self.exchange_info().await?;
        let symbols = info.perpetual_symbols(&self.quote_asset);
        debug!(
            quote_asset = %self.quote_asset,
            count = symbols.len(),
            "Loaded {} perpetual symbols",
            symbols.len()
        );
        Ok(symbols)
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        window_hours: u32,
    ) -> Result<CandleSeries, FetchError> {
        // The exchange pages forward from startTime, so a wider window would
        // drop the latest candles.
        let window_hours = window_hours.min(KLINES_LIMIT);
        let end = Utc::now();
        let start = end - ChronoDuration::hours(i64::from(window_hours));

        let query = [
            ("symbol", symbol.to_string()),
            ("interval", KLINES_INTERVAL.to_string()),
            ("startTime", start.timestamp_millis().to_string()),
            ("endTime", end.timestamp_millis().to_string()),
            ("limit", KLINES_LIMIT.to_string()),
        ];

        let body = self.get_json(KLINES_PATH, &query).await?;
        let candles = parse_klines(&body)?;
        debug!(
            symbol = symbol,
            window_hours = window_hours,
            count = candles.len(),
            "Fetched {} candles for {}",
            candles.len(),
            symbol
        );
        Ok(CandleSeries::new(symbol, candles))
    }
}
