//! Error types for fetching, per-asset analysis and whole scans.
//!
//! [`FetchError`] covers the market-data boundary, [`SkipReason`] explains why
//! a single candidate produced no analysis, and [`ScanError`] is reserved for
//! failures that make a whole run meaningless.

/// Failure talking to the market-data source.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection, timeout or body-decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status}")]
    Status { status: u16 },

    /// The response parsed but does not have the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("empty response")]
    Empty,
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            FetchError::Status { status } => *status == 429 || *status >= 500,
            FetchError::Malformed(_) | FetchError::Empty => false,
        }
    }
}

/// Why a candidate was left out of a scan.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("market data unavailable: {0}")]
    DataUnavailable(String),

    #[error("{symbol} has {available} candles, {required} required")]
    InsufficientHistory {
        symbol: String,
        available: usize,
        required: usize,
    },

    /// Zero variance or non-finite returns in one of the windows.
    #[error("correlation undefined over the {window} window")]
    UndefinedCorrelation { window: &'static str },

    #[error("24h return undefined")]
    UndefinedReturn,
}

impl SkipReason {
    /// Stable label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::DataUnavailable(_) => "data_unavailable",
            SkipReason::InsufficientHistory { .. } => "insufficient_history",
            SkipReason::UndefinedCorrelation { .. } => "undefined_correlation",
            SkipReason::UndefinedReturn => "undefined_return",
        }
    }
}

impl From<FetchError> for SkipReason {
    fn from(err: FetchError) -> Self {
        SkipReason::DataUnavailable(err.to_string())
    }
}

/// A failure that ends the run with zero signals.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("reference series {symbol} unavailable: {source}")]
    ReferenceUnavailable {
        symbol: String,
        #[source]
        source: FetchError,
    },

    #[error("reference series {symbol} has {available} candles, {required} required")]
    InsufficientReferenceHistory {
        symbol: String,
        available: usize,
        required: usize,
    },
}
