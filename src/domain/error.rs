//! Domain error types.

use std::fmt;

/// Structural failures while turning samples into candles. These abort a run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResampleError {
    #[error("no samples to resample")]
    EmptyInput,

    #[error("invalid interval {interval}: must be at least 1")]
    InvalidInterval { interval: i64 },

    #[error("sample {index} at {timestamp} precedes previous sample at {previous}")]
    OutOfOrder {
        index: usize,
        timestamp: i64,
        previous: i64,
    },
}

/// Which balance a ledger operation ran short of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Cash,
    LongPosition,
    ShortPosition,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Cash => write!(f, "cash"),
            Resource::LongPosition => write!(f, "long position"),
            Resource::ShortPosition => write!(f, "short position"),
        }
    }
}

/// A rejected ledger operation. The ledger is unchanged when one is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid price {price}: must be finite and positive")]
    InvalidPrice { price: f64 },

    #[error("timestamp {timestamp} precedes last transaction at {last}")]
    TemporalOrder { timestamp: i64, last: i64 },

    #[error("invalid quantity {number}: must be finite and positive")]
    InvalidQuantity { number: f64 },

    #[error("insufficient {resource}: need {required}, have {available}")]
    InsufficientResource {
        resource: Resource,
        required: f64,
        available: f64,
    },
}

/// Top-level error type for tickreplay.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no samples between {start} and {end}")]
    NoData { start: i64, end: i64 },

    #[error(transparent)]
    Resample(#[from] ResampleError),

    #[error("invalid window size {window_size}: must be at least 1")]
    InvalidWindow { window_size: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ReplayError> for std::process::ExitCode {
    fn from(err: &ReplayError) -> Self {
        let code: u8 = match err {
            ReplayError::Io(_) => 1,
            ReplayError::ConfigParse { .. }
            | ReplayError::ConfigMissing { .. }
            | ReplayError::ConfigInvalid { .. } => 2,
            ReplayError::Data { .. } | ReplayError::NoData { .. } => 3,
            ReplayError::Resample(_) => 4,
            ReplayError::InvalidWindow { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_resource_names_the_balance() {
        let err = LedgerError::InsufficientResource {
            resource: Resource::Cash,
            required: 1500.0,
            available: 1000.0,
        };
        assert_eq!(err.to_string(), "insufficient cash: need 1500, have 1000");
    }

    #[test]
    fn temporal_order_reports_both_timestamps() {
        let err = LedgerError::TemporalOrder {
            timestamp: -1,
            last: 0,
        };
        assert_eq!(err.to_string(), "timestamp -1 precedes last transaction at 0");
    }

    #[test]
    fn resample_error_is_transparent() {
        let err: ReplayError = ResampleError::EmptyInput.into();
        assert_eq!(err.to_string(), "no samples to resample");
    }

    #[test]
    fn config_missing_message() {
        let err = ReplayError::ConfigMissing {
            section: "backtest".into(),
            key: "start".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] start");
    }
}
