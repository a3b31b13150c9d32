use thiserror::Error;

use crate::core::traits::Precision;

// Unified error type for gmresdr

#[derive(Error, Debug)]
pub enum KError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("precision mismatch: basis is {basis:?}, dense backend works in {dense:?}")]
    PrecisionMismatch { basis: Precision, dense: Precision },
    #[error("{routine} failed, info {info}")]
    NumericalFailure { routine: &'static str, info: i64 },
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

impl KError {
    pub(crate) fn numerical(routine: &'static str, info: i64) -> Self {
        KError::NumericalFailure { routine, info }
    }
}
