use crate::StoreError;
use arcal_core::{BoardError, MatrixError, SolveError};

/// Errors returned by the calibration session and projection builder.
///
/// None of these are fatal; each is a status the caller reacts to.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("not enough calibration samples (have {have}, need {need})")]
    InsufficientSamples { have: usize, need: usize },
    #[error("calibration failed: {0}")]
    CalibrationFailed(#[source] SolveError),
    #[error("no calibration loaded")]
    NoCalibration,
    #[error("persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StoreError),
    #[error(transparent)]
    InvalidDimension(#[from] MatrixError),
    #[error(transparent)]
    InvalidBoard(#[from] BoardError),
}
