//! Classification thresholds for decoupling signals.

use crate::models::signal::SignalDirection;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalThresholds {
    /// LONG requires the correlation delta strictly below this.
    pub long_max_delta: f64,
    /// LONG requires the 24h return (%) strictly above this.
    pub long_min_return_pct: f64,
    /// SHORT requires the correlation delta strictly above this.
    pub short_min_delta: f64,
    /// SHORT requires the 24h return (%) strictly below this.
    pub short_max_return_pct: f64,
}

impl SignalThresholds {
    pub const LONG_MAX_DELTA: f64 = -0.15;
    pub const LONG_MIN_RETURN_PCT: f64 = 2.0;
    pub const SHORT_MIN_DELTA: f64 = 0.1;
    pub const SHORT_MAX_RETURN_PCT: f64 = -2.0;

    /// Directions satisfied by the given metrics. The rules are independent,
    /// so custom thresholds may yield both.
    pub fn classify(&self, delta_correlation: f64, return_24h_pct: f64) -> Vec<SignalDirection> {
        let mut directions = Vec::new();
        if delta_correlation < self.long_max_delta && return_24h_pct > self.long_min_return_pct {
            directions.push(SignalDirection::Long);
        }
        if delta_correlation > self.short_min_delta && return_24h_pct < self.short_max_return_pct {
            directions.push(SignalDirection::Short);
        }
        directions
    }
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            long_max_delta: Self::LONG_MAX_DELTA,
            long_min_return_pct: Self::LONG_MIN_RETURN_PCT,
            short_min_delta: Self::SHORT_MIN_DELTA,
            short_max_return_pct: Self::SHORT_MAX_RETURN_PCT,
        }
    }
}
