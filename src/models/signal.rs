use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Long,
    Short,
}

impl SignalDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalDirection::Long => "LONG",
            SignalDirection::Short => "SHORT",
        }
    }
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A trade candidate produced by one scan. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub direction: SignalDirection,
    /// Latest close.
    pub price: f64,
    pub return_24h_pct: f64,
    pub delta_correlation: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
}

/// Metrics computed for one candidate before classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAnalysis {
    pub symbol: String,
    pub price: f64,
    pub return_24h_pct: f64,
    /// Correlation with the reference over the last 24 returns.
    pub corr_now: f64,
    /// Correlation with the reference over the 24 returns before that.
    pub corr_prev: f64,
    pub delta_correlation: f64,
    pub high_24h: f64,
    pub low_24h: f64,
}

impl AssetAnalysis {
    /// Builds the signal for `direction`, placing TP/SL on the side of the
    /// 24h range that matches the trade.
    pub fn to_signal(&self, direction: SignalDirection) -> Signal {
        let (take_profit, stop_loss) = match direction {
            SignalDirection::Long => (self.high_24h, self.low_24h),
            SignalDirection::Short => (self.low_24h, self.high_24h),
        };

        Signal {
            symbol: self.symbol.clone(),
            direction,
            price: self.price,
            return_24h_pct: self.return_24h_pct,
            delta_correlation: self.delta_correlation,
            take_profit,
            stop_loss,
        }
    }
}

/// A candidate that produced no analysis, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    LongsAndShorts,
    LongsOnly,
    ShortsOnly,
    NoSignals,
    /// The run could not complete; only produced at the presentation boundary.
    UpstreamError,
}

/// Result of one pass over the universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    pub reference_symbol: String,
    /// Number of candidates attempted (reference excluded).
    pub scanned: usize,
    /// Sorted ascending by delta correlation.
    pub longs: Vec<Signal>,
    /// Sorted descending by delta correlation.
    pub shorts: Vec<Signal>,
    pub skipped: Vec<SkippedSymbol>,
}

impl ScanReport {
    pub fn status(&self) -> ScanStatus {
        match (self.longs.is_empty(), self.shorts.is_empty()) {
            (false, false) => ScanStatus::LongsAndShorts,
            (false, true) => ScanStatus::LongsOnly,
            (true, false) => ScanStatus::ShortsOnly,
            (true, true) => ScanStatus::NoSignals,
        }
    }

    pub fn has_signals(&self) -> bool {
        self.status() != ScanStatus::NoSignals
    }
}
