//! External market-data services.

pub mod binance;
pub mod market_data;

pub use binance::BinanceFuturesClient;
pub use market_data::MarketDataProvider;
