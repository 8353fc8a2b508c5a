//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for crosstrader.
#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("missing column: {column}")]
    MissingColumn { column: String },

    #[error("signal series contains no buy or sell event")]
    EmptySignal,

    #[error("degenerate statistic {metric}: {reason}")]
    DegenerateStatistic {
        metric: &'static str,
        reason: &'static str,
    },

    #[error("dates must be strictly increasing (offending date {date})")]
    UnorderedDates { date: NaiveDate },

    #[error("series misaligned: no matching price for {date}")]
    Misaligned { date: NaiveDate },

    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BacktestError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        BacktestError::InvalidParameter {
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(metric: &'static str, reason: &'static str) -> Self {
        BacktestError::DegenerateStatistic { metric, reason }
    }
}
