use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("data unavailable for {symbol}: {cause}")]
    DataUnavailable { symbol: String, cause: String },

    #[error("insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("{sink} sink failed: {cause}")]
    SinkFailure { sink: &'static str, cause: String },

    #[error("config error: {0}")]
    Config(String),
}

impl AppError {
    pub fn data_unavailable(symbol: &str, cause: impl ToString) -> Self {
        AppError::DataUnavailable {
            symbol: symbol.to_string(),
            cause: cause.to_string(),
        }
    }

    pub fn sink_failure(sink: &'static str, cause: impl ToString) -> Self {
        AppError::SinkFailure {
            sink,
            cause: cause.to_string(),
        }
    }
}
