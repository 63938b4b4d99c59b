//! Unit tests for the batch orchestrator

use crate::fixtures::*;
use altpulse::config::ScanConfig;
use altpulse::core::scanner::{select_candidates, Scanner};
use altpulse::metrics::Metrics;
use altpulse::models::candle::CandleSeries;
use altpulse::models::signal::{ScanStatus, SignalDirection};
use altpulse::services::market_data::MarketDataProvider;
use altpulse::{FetchError, ScanError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

/// Serves fixed series; unknown symbols behave like an empty response.
#[derive(Default)]
struct InMemoryProvider {
    universe: Option<Vec<String>>,
    series: HashMap<String, CandleSeries>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl InMemoryProvider {
    fn new(universe: &[&str]) -> Self {
        Self {
            universe: Some(universe.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    fn with_series(mut self, series: CandleSeries) -> Self {
        self.series.insert(series.symbol.clone(), series);
        self
    }

    fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for InMemoryProvider {
    async fn list_universe(&self) -> Result<Vec<String>, FetchError> {
        self.universe
            .clone()
            .ok_or(FetchError::Status { status: 503 })
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        _window_hours: u32,
    ) -> Result<CandleSeries, FetchError> {
        self.requested.lock().unwrap().push(symbol.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match symbol {
            "GARBAGEUSDT" => Err(FetchError::Malformed("not an array".into())),
            _ => self.series.get(symbol).cloned().ok_or(FetchError::Empty),
        }
    }
}

fn test_config() -> ScanConfig {
    ScanConfig {
        request_delay: Duration::ZERO,
        max_concurrent_requests: 4,
        ..ScanConfig::default()
    }
}

fn full_provider() -> InMemoryProvider {
    InMemoryProvider::new(&[
        "AAAUSDT", "BTCUSDT", "L1USDT", "S1USDT", "L2USDT", "FLATUSDT", "S2USDT",
        "GARBAGEUSDT", "L3USDT", "MISSINGUSDT", "S3USDT", "TWINUSDT",
    ])
    .with_series(reference_series())
    .with_series(decoupled_riser("L1USDT", 0.5))
    .with_series(decoupled_riser("L2USDT", 0.0))
    .with_series(decoupled_riser("L3USDT", 1.0))
    .with_series(recoupled_faller("S1USDT", 1.0))
    .with_series(recoupled_faller("S2USDT", 0.0))
    .with_series(recoupled_faller("S3USDT", 2.0))
    .with_series(flat_series("FLATUSDT", 49))
    .with_series(series_from_returns("TWINUSDT", &alternating(48)))
    .with_series(series_from_returns("AAAUSDT", &alternating(20)))
}

#[tokio::test]
async fn test_scan_splits_and_orders_signals() {
    let scanner = Scanner::new(Arc::new(full_provider()), test_config());
    let report = assert_ok!(scanner.run().await);

    assert_eq!(report.reference_symbol, REFERENCE);
    assert_eq!(report.scanned, 11);
    assert_eq!(report.status(), ScanStatus::LongsAndShorts);

    let longs: Vec<&str> = report.longs.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(longs, vec!["L2USDT", "L1USDT", "L3USDT"]);
    assert!(report
        .longs
        .windows(2)
        .all(|w| w[0].delta_correlation <= w[1].delta_correlation));
    assert!(report.longs.iter().all(|s| s.direction == SignalDirection::Long));

    let shorts: Vec<&str> = report.shorts.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(shorts, vec!["S2USDT", "S1USDT", "S3USDT"]);
    assert!(report
        .shorts
        .windows(2)
        .all(|w| w[0].delta_correlation >= w[1].delta_correlation));
}

#[tokio::test]
async fn test_bad_candidates_do_not_stop_the_batch() {
    let scanner = Scanner::new(Arc::new(full_provider()), test_config());
    let report = scanner.run().await.unwrap();

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(
        skipped,
        vec!["AAAUSDT", "FLATUSDT", "GARBAGEUSDT", "MISSINGUSDT"]
    );
    assert!(report.skipped[0].reason.contains("21 candles"));
    assert!(report.skipped[2].reason.contains("malformed"));
    assert_eq!(report.longs.len() + report.shorts.len(), 6);
}

#[tokio::test]
async fn test_reference_is_never_a_candidate() {
    let provider = Arc::new(full_provider());
    let scanner = Scanner::new(provider.clone(), test_config());
    let report = scanner.run().await.unwrap();

    assert!(report.longs.iter().chain(&report.shorts).all(|s| s.symbol != REFERENCE));
    let reference_fetches = provider
        .requested()
        .iter()
        .filter(|s| s.as_str() == REFERENCE)
        .count();
    assert_eq!(reference_fetches, 1);
}

#[tokio::test]
async fn test_missing_reference_is_fatal() {
    let provider = InMemoryProvider::new(&["BTCUSDT", "L1USDT"])
        .with_series(decoupled_riser("L1USDT", 0.0));
    let scanner = Scanner::new(Arc::new(provider), test_config());

    let err = assert_err!(scanner.run().await);
    assert!(matches!(err, ScanError::ReferenceUnavailable { ref symbol, .. } if symbol == "BTCUSDT"));
}

#[tokio::test]
async fn test_short_reference_history_is_fatal() {
    let provider = InMemoryProvider::new(&["L1USDT"])
        .with_series(series_from_returns(REFERENCE, &alternating(10)))
        .with_series(decoupled_riser("L1USDT", 0.0));
    let scanner = Scanner::new(Arc::new(provider), test_config());

    let err = scanner.run().await.unwrap_err();
    assert!(matches!(
        err,
        ScanError::InsufficientReferenceHistory { available: 11, .. }
    ));
}

#[tokio::test]
async fn test_unavailable_universe_is_an_empty_scan() {
    let provider = InMemoryProvider {
        universe: None,
        ..Default::default()
    }
    .with_series(reference_series());
    let scanner = Scanner::new(Arc::new(provider), test_config());

    let report = scanner.run().await.unwrap();
    assert_eq!(report.scanned, 0);
    assert_eq!(report.status(), ScanStatus::NoSignals);
}

#[tokio::test]
async fn test_no_qualifying_assets_reports_no_signals() {
    let provider = InMemoryProvider::new(&["TWINUSDT"])
        .with_series(reference_series())
        .with_series(series_from_returns("TWINUSDT", &alternating(48)));
    let scanner = Scanner::new(Arc::new(provider), test_config());

    let report = scanner.run().await.unwrap();
    assert_eq!(report.scanned, 1);
    assert!(report.skipped.is_empty());
    assert_eq!(report.status(), ScanStatus::NoSignals);
}

#[tokio::test]
async fn test_symbol_cap_applies_to_catalog_order() {
    let scanner = Scanner::new(Arc::new(full_provider()), test_config());

    // AAAUSDT, BTCUSDT, L1USDT: the reference counts towards the cap.
    let report = scanner.run_with_limit(Some(3)).await.unwrap();
    assert_eq!(report.scanned, 2);
    assert_eq!(report.longs.len(), 1);
    assert_eq!(report.longs[0].symbol, "L1USDT");
}

#[tokio::test]
async fn test_concurrent_requests_are_bounded() {
    let provider = Arc::new(full_provider().with_latency(Duration::from_millis(20)));
    let config = ScanConfig {
        max_concurrent_requests: 2,
        request_delay: Duration::from_millis(5),
        ..ScanConfig::default()
    };
    let scanner = Scanner::new(provider.clone(), config);

    let report = scanner.run().await.unwrap();
    assert_eq!(report.scanned, 11);
    let peak = provider.max_in_flight.load(Ordering::SeqCst);
    assert!((1..=2).contains(&peak), "peak in-flight requests was {}", peak);
}

#[tokio::test]
async fn test_overlapping_scans_share_the_request_bound() {
    let provider = Arc::new(full_provider().with_latency(Duration::from_millis(20)));
    let config = ScanConfig {
        max_concurrent_requests: 1,
        request_delay: Duration::ZERO,
        ..ScanConfig::default()
    };
    let scanner = Scanner::new(provider.clone(), config);

    let (first, second) = tokio::join!(scanner.run(), scanner.run());
    let first = assert_ok!(first);
    let second = assert_ok!(second);
    assert_eq!(first.longs, second.longs);
    assert_eq!(first.shorts, second.shorts);
    assert_eq!(provider.requested().len(), 24);
    assert_eq!(provider.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_sequential_scan_matches_concurrent_scan() {
    let sequential = ScanConfig {
        max_concurrent_requests: 1,
        request_delay: Duration::ZERO,
        ..ScanConfig::default()
    };
    let a = Scanner::new(Arc::new(full_provider()), sequential)
        .run()
        .await
        .unwrap();
    let b = Scanner::new(Arc::new(full_provider()), test_config())
        .run()
        .await
        .unwrap();

    assert_eq!(a.longs, b.longs);
    assert_eq!(a.shorts, b.shorts);
    assert_eq!(a.skipped, b.skipped);
}

#[tokio::test]
async fn test_scan_records_metrics() {
    let metrics = Arc::new(Metrics::new().unwrap());
    let scanner =
        Scanner::new(Arc::new(full_provider()), test_config()).with_metrics(metrics.clone());
    scanner.run().await.unwrap();

    assert_eq!(metrics.scans_total.get(), 1);
    assert_eq!(metrics.signals_total.with_label_values(&["LONG"]).get(), 3);
    assert_eq!(metrics.signals_total.with_label_values(&["SHORT"]).get(), 3);
    assert_eq!(
        metrics
            .symbols_skipped_total
            .with_label_values(&["data_unavailable"])
            .get(),
        2
    );

    let failing = Scanner::new(Arc::new(InMemoryProvider::new(&[])), test_config())
        .with_metrics(metrics.clone());
    assert!(failing.run().await.is_err());
    assert_eq!(metrics.scan_failures_total.get(), 1);
}

#[test]
fn test_select_candidates() {
    let universe: Vec<String> = ["ETHUSDT", "BTCUSDT", "SOLUSDT", "ETHUSDT", "XRPUSDT"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    assert_eq!(
        select_candidates(universe.clone(), None, "BTCUSDT"),
        vec!["ETHUSDT", "SOLUSDT", "XRPUSDT"]
    );
    assert_eq!(
        select_candidates(universe.clone(), Some(2), "BTCUSDT"),
        vec!["ETHUSDT"]
    );
    assert!(select_candidates(universe, Some(0), "BTCUSDT").is_empty());
}
