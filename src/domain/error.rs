//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for algotrader.
#[derive(Debug, thiserror::Error)]
pub enum AlgoError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("data source error for {ticker}: {reason}")]
    DataSource { ticker: String, reason: String },

    #[error("price series for {ticker} is not strictly increasing at {date}")]
    UnorderedSeries { ticker: String, date: NaiveDate },

    #[error("insufficient backtest window for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientWindow {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error("insufficient data to train classifier: {reason}")]
    InsufficientTrainingData { reason: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to publish worksheet '{worksheet}': {reason}")]
    Publish { worksheet: String, reason: String },

    #[error("alert delivery failed: {reason}")]
    Alert { reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&AlgoError> for std::process::ExitCode {
    fn from(err: &AlgoError) -> Self {
        let code: u8 = match err {
            AlgoError::Io(_) | AlgoError::Csv(_) => 1,
            AlgoError::ConfigParse { .. } | AlgoError::ConfigInvalid { .. } => 2,
            AlgoError::NoData { .. }
            | AlgoError::DataSource { .. }
            | AlgoError::UnorderedSeries { .. }
            | AlgoError::InsufficientWindow { .. }
            | AlgoError::InsufficientTrainingData { .. } => 5,
            AlgoError::Http(_) | AlgoError::Publish { .. } | AlgoError::Alert { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
