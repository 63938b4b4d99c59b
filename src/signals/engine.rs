//! Correlation-shift signal engine.
//!
//! Compares a candidate's hourly returns against the reference asset over two
//! consecutive 24-point windows and classifies the change in correlation
//! together with the candidate's 24h return.

use crate::error::SkipReason;
use crate::models::candle::CandleSeries;
use crate::models::signal::{AssetAnalysis, Signal};
use crate::signals::returns::{pct_change, pearson, simple_returns};
use crate::signals::thresholds::SignalThresholds;

/// Points in each correlation window.
pub const CORRELATION_WINDOW: usize = 24;

/// Candles both series need: a recent and a prior window.
pub const MIN_CANDLES: usize = 2 * CORRELATION_WINDOW;

#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    thresholds: SignalThresholds,
}

impl SignalEngine {
    pub fn new(thresholds: SignalThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &SignalThresholds {
        &self.thresholds
    }

    /// Checks that `series` is long enough to be analysed.
    pub fn ensure_history(series: &CandleSeries) -> Result<(), SkipReason> {
        if series.len() < MIN_CANDLES {
            return Err(SkipReason::InsufficientHistory {
                symbol: series.symbol.clone(),
                available: series.len(),
                required: MIN_CANDLES,
            });
        }
        Ok(())
    }

    /// Computes correlation shift, 24h return and 24h range for `candidate`.
    pub fn analyze(
        &self,
        candidate: &CandleSeries,
        reference: &CandleSeries,
    ) -> Result<AssetAnalysis, SkipReason> {
        Self::ensure_history(candidate)?;
        Self::ensure_history(reference)?;

        let candidate_returns = simple_returns(&candidate.closes());
        let reference_returns = simple_returns(&reference.closes());

        // Both series are aligned on their most recent candle.
        let (cand_prior, cand_recent) = split_windows(&candidate_returns);
        let (ref_prior, ref_recent) = split_windows(&reference_returns);

        let corr_now = pearson(cand_recent, ref_recent)
            .ok_or(SkipReason::UndefinedCorrelation { window: "recent" })?;
        let corr_prev = pearson(cand_prior, ref_prior)
            .ok_or(SkipReason::UndefinedCorrelation { window: "prior" })?;
        let delta_correlation = corr_now - corr_prev;

        let candles = candidate.candles();
        let last = candles[candles.len() - 1].close;
        // The candle just before the 24h window is the baseline.
        let base = candles[candles.len() - 1 - CORRELATION_WINDOW].close;
        let return_24h_pct = pct_change(base, last).ok_or(SkipReason::UndefinedReturn)?;

        let day = candidate.tail(CORRELATION_WINDOW);
        let high_24h = day.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let low_24h = day.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);

        Ok(AssetAnalysis {
            symbol: candidate.symbol.clone(),
            price: last,
            return_24h_pct,
            corr_now,
            corr_prev,
            delta_correlation,
            high_24h,
            low_24h,
        })
    }

    /// Signals implied by an analysis under this engine's thresholds.
    pub fn signals_for(&self, analysis: &AssetAnalysis) -> Vec<Signal> {
        self.thresholds
            .classify(analysis.delta_correlation, analysis.return_24h_pct)
            .into_iter()
            .map(|direction| analysis.to_signal(direction))
            .collect()
    }

    /// Analyse and classify in one step.
    pub fn evaluate(
        &self,
        candidate: &CandleSeries,
        reference: &CandleSeries,
    ) -> Result<Vec<Signal>, SkipReason> {
        let analysis = self.analyze(candidate, reference)?;
        Ok(self.signals_for(&analysis))
    }
}

/// Splits the trailing `2 * CORRELATION_WINDOW` returns into (prior, recent).
fn split_windows(returns: &[f64]) -> (&[f64], &[f64]) {
    let n = returns.len();
    let recent_start = n - CORRELATION_WINDOW;
    let prior_start = n - MIN_CANDLES;
    (&returns[prior_start..recent_start], &returns[recent_start..])
}
