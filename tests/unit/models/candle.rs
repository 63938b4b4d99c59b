//! Unit tests for candle models

use crate::fixtures::{base_time, series_from_closes};
use altpulse::models::candle::{Candle, CandleSeries};
use chrono::Duration;

fn candle_at(hour: i64, close: f64) -> Candle {
    let open_time = base_time() + Duration::hours(hour);
    Candle::new(open_time, close, close, close, close, 1.0, open_time + Duration::hours(1))
}

#[test]
fn test_series_orders_candles_by_open_time() {
    let series = CandleSeries::new(
        "ETHUSDT",
        vec![candle_at(2, 3.0), candle_at(0, 1.0), candle_at(1, 2.0)],
    );
    assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    assert_eq!(series.last().unwrap().close, 3.0);
}

#[test]
fn test_series_tail() {
    let series = series_from_closes("ETHUSDT", &[1.0, 2.0, 3.0, 4.0]);
    let tail: Vec<f64> = series.tail(2).iter().map(|c| c.close).collect();
    assert_eq!(tail, vec![3.0, 4.0]);
    assert_eq!(series.tail(10).len(), 4);
}

#[test]
fn test_empty_series() {
    let series = CandleSeries::new("ETHUSDT", Vec::new());
    assert!(series.is_empty());
    assert!(series.last().is_none());
    assert!(series.tail(24).is_empty());
}
