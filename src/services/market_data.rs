//! Market data provider interface.

use crate::error::FetchError;
use crate::models::candle::CandleSeries;

#[async_trait::async_trait]
pub trait MarketDataProvider {
    /// All tradable symbols in the scanner's universe, in catalog order.
    async fn list_universe(&self) -> Result<Vec<String>, FetchError>;

    /// Hourly candles covering the most recent `window_hours`, ending now.
    async fn fetch_candles(
        &self,
        symbol: &str,
        window_hours: u32,
    ) -> Result<CandleSeries, FetchError>;
}
