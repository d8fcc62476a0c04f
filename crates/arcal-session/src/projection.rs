use crate::SessionError;
use arcal_core::{compute_projection_matrix, Intrinsics, Pose, ProjectionMatrix};
use nalgebra::Matrix4;

/// Per-frame AR projection from the currently held intrinsics.
///
/// Borrowed from a session; holds no state of its own.
#[derive(Clone, Copy, Debug)]
pub struct ProjectionBuilder<'a> {
    intrinsics: Option<&'a Intrinsics>,
}

impl<'a> ProjectionBuilder<'a> {
    pub fn new(intrinsics: Option<&'a Intrinsics>) -> Self {
        Self { intrinsics }
    }

    pub fn is_calibrated(&self) -> bool {
        self.intrinsics.is_some()
    }

    /// Compose the projection for `pose` seen through `view` at display
    /// scale `ratio`.
    pub fn build(
        &self,
        ratio: f64,
        pose: &Pose,
        view: &Matrix4<f64>,
    ) -> Result<ProjectionMatrix, SessionError> {
        let intrinsics = self.intrinsics.ok_or(SessionError::NoCalibration)?;
        Ok(compute_projection_matrix(
            ratio,
            &intrinsics.camera,
            pose.rotation(),
            pose.translation(),
            view,
        ))
    }
}
