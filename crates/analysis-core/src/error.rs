use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}
