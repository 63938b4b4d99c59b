//! Binance USD-M futures REST market data.

pub mod client;
pub mod messages;

pub use client::{BinanceFuturesClient, DEFAULT_BASE_URL, KLINES_LIMIT};
pub use messages::{parse_klines, ExchangeInfo, SymbolInfo, KLINE_FIELD_COUNT};
