use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Insufficient data for {indicator}: need at least {required} bars, got {actual}")]
    InsufficientData {
        indicator: String,
        required: usize,
        actual: usize,
    },

    /// Zero range, zero volume or a zero divisor met mid-calculation.
    /// Recovered locally by the documented substitute, never fatal.
    #[error("Degenerate input in {indicator}: {detail}")]
    DegenerateInput { indicator: String, detail: String },

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Data loading error: {0}")]
    DataLoadError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parse error: {0}")]
    CsvError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl ScanError {
    pub fn insufficient(indicator: &str, required: usize, actual: usize) -> Self {
        Self::InsufficientData {
            indicator: indicator.to_string(),
            required,
            actual,
        }
    }

    pub fn degenerate(indicator: &str, detail: impl Into<String>) -> Self {
        Self::DegenerateInput {
            indicator: indicator.to_string(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
