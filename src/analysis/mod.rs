pub mod autocorrelation;
pub mod decomposition;
pub mod distribution;
pub mod features;
pub mod rolling;
pub mod stats;

use crate::data::DataError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("Rolling window must be at least 1")]
    InvalidWindow,
    #[error("Seasonal period must be at least 2, got {0}")]
    InvalidPeriod(usize),
    #[error("Insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },
    #[error("Multiplicative decomposition requires strictly positive values, got {value} at index {index}")]
    NonPositive { index: usize, value: f64 },
    #[error("Series has undefined values at index {0}")]
    MissingValues(usize),
    #[error("Series has zero variance")]
    ZeroVariance,
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Unwraps a fully defined column, reporting the first gap.
pub(crate) fn require_defined(values: &[Option<f64>]) -> Result<Vec<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| v.ok_or(AnalysisError::MissingValues(i)))
        .collect()
}
