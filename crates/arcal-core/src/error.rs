/// Shape errors for flat numeric arrays handed to the fixed-size matrix types.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("invalid dimension: expected {expected} values, got {got}")]
    InvalidDimension { expected: usize, got: usize },
    #[error("matrix contains non-finite values")]
    NonFinite,
}

/// Failures of the closed-form calibration math.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("need at least {needed} views, got {got}")]
    NotEnoughViews { needed: usize, got: usize },
    #[error("view {view}: need at least 4 correspondences, got {got}")]
    NotEnoughPoints { view: usize, got: usize },
    #[error("view {view}: object points are not on the z = 0 plane")]
    NonPlanarTarget { view: usize },
    #[error("view {view}: homography estimation failed")]
    HomographyFailed { view: usize },
    #[error("view {view}: pose recovery failed")]
    PoseFailed { view: usize },
    #[error("invalid image size {width}x{height}")]
    InvalidImageSize { width: u32, height: u32 },
    #[error("degenerate view configuration")]
    Degenerate,
}
