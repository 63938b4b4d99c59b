//! Batch orchestrator: one pass of the signal engine over the universe.

use crate::config::ScanConfig;
use crate::error::{FetchError, ScanError, SkipReason};
use crate::metrics::Metrics;
use crate::models::candle::CandleSeries;
use crate::models::signal::{AssetAnalysis, ScanReport, SignalDirection, SkippedSymbol};
use crate::services::market_data::MarketDataProvider;
use crate::signals::engine::{SignalEngine, MIN_CANDLES};
use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

pub struct Scanner {
    provider: Arc<dyn MarketDataProvider + Send + Sync>,
    config: ScanConfig,
    engine: SignalEngine,
    metrics: Option<Arc<Metrics>>,
    /// Shared by every run on this scanner, so overlapping scans stay
    /// within `max_concurrent_requests` together.
    request_slots: Semaphore,
}

impl Scanner {
    pub fn new(provider: Arc<dyn MarketDataProvider + Send + Sync>, config: ScanConfig) -> Self {
        let engine = SignalEngine::new(config.thresholds);
        let request_slots = Semaphore::new(config.max_concurrent_requests.max(1));
        Self {
            provider,
            config,
            engine,
            metrics: None,
            request_slots,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scans with the configured symbol cap.
    pub async fn run(&self) -> Result<ScanReport, ScanError> {
        self.run_with_limit(self.config.max_symbols).await
    }

    /// Scans at most `max_symbols` catalog entries (`None` for all).
    ///
    /// Fails only when the reference series cannot be used; every other
    /// failure is recorded per symbol in [`ScanReport::skipped`].
    pub async fn run_with_limit(&self, max_symbols: Option<usize>) -> Result<ScanReport, ScanError> {
        let start = Instant::now();
        let result = self.scan(max_symbols).await;

        if let Some(ref metrics) = self.metrics {
            metrics
                .scan_duration_seconds
                .observe(start.elapsed().as_secs_f64());
            match &result {
                Ok(report) => {
                    metrics.scans_total.inc();
                    metrics
                        .signals_total
                        .with_label_values(&[SignalDirection::Long.as_str()])
                        .inc_by(report.longs.len() as u64);
                    metrics
                        .signals_total
                        .with_label_values(&[SignalDirection::Short.as_str()])
                        .inc_by(report.shorts.len() as u64);
                }
                Err(_) => metrics.scan_failures_total.inc(),
            }
        }

        result
    }

    async fn scan(&self, max_symbols: Option<usize>) -> Result<ScanReport, ScanError> {
        let reference_symbol = self.config.reference_symbol.as_str();

        let universe = match self.provider.list_universe().await {
            Ok(symbols) => symbols,
            Err(e) => {
                warn!(error = %e, "Scanner: symbol universe unavailable, scanning nothing");
                Vec::new()
            }
        };
        let candidates = select_candidates(universe, max_symbols, reference_symbol);

        let reference = self.load_reference().await?;
        info!(
            reference = %reference_symbol,
            candles = reference.len(),
            candidates = candidates.len(),
            "Scanner: reference loaded, scanning {} candidates",
            candidates.len()
        );

        let concurrency = self.config.max_concurrent_requests.max(1);
        let outcomes: Vec<(String, Result<AssetAnalysis, SkipReason>)> = stream::iter(candidates)
            .map(|symbol| {
                let reference = &reference;
                async move {
                    let outcome = self.analyze_symbol(&symbol, reference).await;
                    (symbol, outcome)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        let scanned = outcomes.len();
        let mut longs = Vec::new();
        let mut shorts = Vec::new();
        let mut skipped = Vec::new();

        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(analysis) => {
                    for signal in self.engine.signals_for(&analysis) {
                        info!(
                            symbol = %signal.symbol,
                            direction = %signal.direction,
                            delta_correlation = signal.delta_correlation,
                            return_24h_pct = signal.return_24h_pct,
                            "Scanner: {} signal for {}",
                            signal.direction,
                            signal.symbol
                        );
                        match signal.direction {
                            SignalDirection::Long => longs.push(signal),
                            SignalDirection::Short => shorts.push(signal),
                        }
                    }
                }
                Err(reason) => {
                    debug!(symbol = %symbol, reason = %reason, "Scanner: skipping {}", symbol);
                    if let Some(ref metrics) = self.metrics {
                        metrics
                            .symbols_skipped_total
                            .with_label_values(&[reason.label()])
                            .inc();
                    }
                    skipped.push(SkippedSymbol {
                        symbol,
                        reason: reason.to_string(),
                    });
                }
            }
        }

        longs.sort_by(|a, b| a.delta_correlation.total_cmp(&b.delta_correlation));
        shorts.sort_by(|a, b| b.delta_correlation.total_cmp(&a.delta_correlation));
        skipped.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        info!(
            scanned = scanned,
            longs = longs.len(),
            shorts = shorts.len(),
            skipped = skipped.len(),
            "Scanner: scan complete"
        );

        Ok(ScanReport {
            generated_at: Utc::now(),
            reference_symbol: reference_symbol.to_string(),
            scanned,
            longs,
            shorts,
            skipped,
        })
    }

    async fn load_reference(&self) -> Result<CandleSeries, ScanError> {
        let symbol = &self.config.reference_symbol;
        let reference = self.fetch_paced(symbol).await.map_err(|source| {
            error!(symbol = %symbol, error = %source, "Scanner: reference data unavailable");
            ScanError::ReferenceUnavailable {
                symbol: symbol.clone(),
                source,
            }
        })?;

        if reference.len() < MIN_CANDLES {
            error!(
                symbol = %symbol,
                candles = reference.len(),
                "Scanner: not enough reference history"
            );
            return Err(ScanError::InsufficientReferenceHistory {
                symbol: symbol.clone(),
                available: reference.len(),
                required: MIN_CANDLES,
            });
        }

        Ok(reference)
    }

    async fn analyze_symbol(
        &self,
        symbol: &str,
        reference: &CandleSeries,
    ) -> Result<AssetAnalysis, SkipReason> {
        let candidate = self.fetch_paced(symbol).await?;
        self.engine.analyze(&candidate, reference)
    }

    /// Fetches under a request slot, holding it for the courtesy delay.
    async fn fetch_paced(&self, symbol: &str) -> Result<CandleSeries, FetchError> {
        // The semaphore is never closed.
        let _slot = self.request_slots.acquire().await.ok();

        let fetched = self
            .provider
            .fetch_candles(symbol, self.config.window_hours)
            .await;
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }
        fetched
    }
}

/// Applies the catalog cap, then drops the reference and duplicates.
pub fn select_candidates(
    universe: Vec<String>,
    max_symbols: Option<usize>,
    reference_symbol: &str,
) -> Vec<String> {
    let cap = max_symbols.unwrap_or(usize::MAX);
    let mut candidates: Vec<String> = Vec::new();
    for symbol in universe.into_iter().take(cap) {
        if symbol != reference_symbol && !candidates.contains(&symbol) {
            candidates.push(symbol);
        }
    }
    candidates
}
