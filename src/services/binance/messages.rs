//! Wire types and response validation for the futures REST endpoints.

use crate::error::FetchError;
use crate::models::candle::Candle;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Fields per kline record: open time, OHLCV, close time, quote volume,
/// trade count, taker buy base/quote volume and an unused trailer.
pub const KLINE_FIELD_COUNT: usize = 12;

pub const PERPETUAL_CONTRACT: &str = "PERPETUAL";

/// `GET /fapi/v1/exchangeInfo` (only the fields the scanner needs).
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeInfo {
    #[serde(default)]
    pub symbols: Vec<SymbolInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(rename = "contractType", default)]
    pub contract_type: String,
    #[serde(rename = "quoteAsset", default)]
    pub quote_asset: String,
}

impl SymbolInfo {
    pub fn is_perpetual_in(&self, quote_asset: &str) -> bool {
        self.contract_type == PERPETUAL_CONTRACT && self.quote_asset == quote_asset
    }
}

impl ExchangeInfo {
    /// Perpetual symbols quoted in `quote_asset`, catalog order, no duplicates.
    pub fn perpetual_symbols(&self, quote_asset: &str) -> Vec<String> {
        let mut symbols: Vec<String> = Vec::new();
        for info in self.symbols.iter().filter(|s| s.is_perpetual_in(quote_asset)) {
            if !symbols.contains(&info.symbol) {
                symbols.push(info.symbol.clone());
            }
        }
        symbols
    }
}

/// Validates a `GET /fapi/v1/klines` body and converts it into candles.
///
/// Any deviation from an array of fixed-length records is rejected as a
/// whole rather than partially parsed.
pub fn parse_klines(body: &Value) -> Result<Vec<Candle>, FetchError> {
    let rows = body
        .as_array()
        .ok_or_else(|| FetchError::Malformed("klines response is not an array".into()))?;

    if rows.is_empty() {
        return Err(FetchError::Empty);
    }

    let mut candles: Vec<Candle> = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let candle = parse_kline_row(row)
            .map_err(|e| FetchError::Malformed(format!("kline {}: {}", index, e)))?;

        if let Some(prev) = candles.last() {
            if candle.open_time <= prev.open_time {
                return Err(FetchError::Malformed(format!(
                    "kline {}: open time not increasing",
                    index
                )));
            }
        }
        candles.push(candle);
    }

    Ok(candles)
}

fn parse_kline_row(row: &Value) -> Result<Candle, String> {
    let fields = row.as_array().ok_or("record is not an array")?;
    if fields.len() != KLINE_FIELD_COUNT {
        return Err(format!(
            "expected {} fields, got {}",
            KLINE_FIELD_COUNT,
            fields.len()
        ));
    }

    Ok(Candle::new(
        timestamp_field(&fields[0], "open_time")?,
        price_field(&fields[1], "open")?,
        price_field(&fields[2], "high")?,
        price_field(&fields[3], "low")?,
        price_field(&fields[4], "close")?,
        price_field(&fields[5], "volume")?,
        timestamp_field(&fields[6], "close_time")?,
    ))
}

/// Decimal fields arrive as strings; plain JSON numbers are accepted too.
fn price_field(value: &Value, name: &str) -> Result<f64, String> {
    let parsed = match value {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid {} '{}': {}", name, s, e))?,
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| format!("invalid {}: {}", name, n))?,
        other => return Err(format!("invalid {}: {}", name, other)),
    };

    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("non-finite {}", name))
    }
}

fn timestamp_field(value: &Value, name: &str) -> Result<DateTime<Utc>, String> {
    let millis = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| format!("invalid {}: {}", name, value))?;

    DateTime::from_timestamp_millis(millis).ok_or_else(|| format!("{} out of range", name))
}
