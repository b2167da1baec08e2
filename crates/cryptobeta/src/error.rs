//! Error types for fetching series and estimating beta.

use thiserror::Error;

/// Result type for cryptobeta operations.
pub type Result<T> = std::result::Result<T, BetaError>;

/// Errors that can occur while fetching market data or computing beta.
#[derive(Debug, Error)]
pub enum BetaError {
    /// Transport-level failure talking to the market data endpoint
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Market data endpoint answered with a non-2xx status
    #[error("Fetch failed for {symbol}: status {status}")]
    Status {
        /// Symbol that was requested
        symbol: String,
        /// HTTP status code returned
        status: u16,
    },

    /// A candlestick record could not be parsed
    #[error("Malformed record {index} for {symbol}: {reason}")]
    MalformedRecord {
        /// Symbol the record belongs to
        symbol: String,
        /// Position of the record in the response
        index: usize,
        /// What was wrong with it
        reason: String,
    },

    /// JSON encoding or decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Price that is negative, NaN or infinite
    #[error("Invalid price {value} at index {index}")]
    InvalidPrice {
        /// Position in the price series
        index: usize,
        /// Offending value
        value: f64,
    },

    /// Return that is NaN or infinite, typically from a zero price
    #[error("Non-finite return at index {index}")]
    NonFiniteReturn {
        /// Position in the return series
        index: usize,
    },

    /// Return series of different lengths
    #[error("Length mismatch: base has {base} returns, alt has {alt}")]
    LengthMismatch {
        /// Length of the base (regressor) series
        base: usize,
        /// Length of the alt (response) series
        alt: usize,
    },

    /// Base series has zero variance, beta is undefined
    #[error("Zero variance in base returns over {observations} observations")]
    ZeroVariance {
        /// Number of observations in the window
        observations: usize,
    },

    /// Insufficient data for the computation
    #[error("Insufficient data: need {required} observations, got {available}")]
    InsufficientData {
        /// Required number of observations
        required: usize,
        /// Available number of observations
        available: usize,
    },

    /// Interval string outside the recognized set
    #[error("Unknown interval: {0}")]
    UnknownInterval(String),

    /// Symbol outside the configured universe
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Symbol that is not an upper-case alphanumeric pair
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BetaError {
    /// Whether this error only concerns one asset's computation.
    ///
    /// Degenerate input flags a single asset; everything else aborts the cycle.
    pub const fn is_degenerate(&self) -> bool {
        matches!(
            self,
            Self::ZeroVariance { .. }
                | Self::LengthMismatch { .. }
                | Self::InsufficientData { .. }
                | Self::NonFiniteReturn { .. }
        )
    }

    /// Whether this error came from fetching or decoding a series.
    ///
    /// An invalid price means the source delivered a bad record, so it aborts
    /// the cycle like any other malformed payload.
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Status { .. }
                | Self::MalformedRecord { .. }
                | Self::Json(_)
                | Self::InvalidPrice { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_classification() {
        assert!(BetaError::ZeroVariance { observations: 3 }.is_degenerate());
        assert!(BetaError::LengthMismatch { base: 3, alt: 2 }.is_degenerate());
        assert!(BetaError::NonFiniteReturn { index: 0 }.is_degenerate());
        assert!(!BetaError::UnknownSymbol("FOO".into()).is_degenerate());
    }

    #[test]
    fn test_invalid_price_is_fetch_failure() {
        let err = BetaError::InvalidPrice {
            index: 1,
            value: f64::NAN,
        };
        assert!(err.is_fetch_failure());
        assert!(!err.is_degenerate());
    }

    #[test]
    fn test_fetch_failure_classification() {
        let err = BetaError::Status {
            symbol: "ETHUSDT".into(),
            status: 503,
        };
        assert!(err.is_fetch_failure());
        assert!(!err.is_degenerate());
        assert_eq!(err.to_string(), "Fetch failed for ETHUSDT: status 503");
    }
}
