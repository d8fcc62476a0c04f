//! Intrinsics solver contract and the default closed-form planar solver.

use arcal_core::{
    estimate_homography, estimate_intrinsics_from_homographies, planar_pose_from_homography,
    reprojection_rms, CameraMatrix, CorrespondenceSet, Distortion, ImageSize, SolveError,
};
use nalgebra::{Matrix3, Point2};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Result of a calibration solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverOutput {
    pub camera: CameraMatrix,
    pub distortion: Distortion,
    /// RMS reprojection error per sample, in pixels, in sample order.
    pub per_view_errors: Vec<f64>,
}

impl SolverOutput {
    /// RMS reprojection error over all samples.
    pub fn rms(&self) -> f64 {
        if self.per_view_errors.is_empty() {
            return 0.0;
        }
        let mean_sq = self.per_view_errors.iter().map(|e| e * e).sum::<f64>()
            / self.per_view_errors.len() as f64;
        mean_sq.sqrt()
    }
}

/// Camera calibration solver supplied by a vision backend.
pub trait IntrinsicsSolver {
    fn calibrate(
        &self,
        samples: &[CorrespondenceSet],
        image_size: ImageSize,
    ) -> Result<SolverOutput, SolveError>;
}

impl<S: IntrinsicsSolver + ?Sized> IntrinsicsSolver for &S {
    fn calibrate(
        &self,
        samples: &[CorrespondenceSet],
        image_size: ImageSize,
    ) -> Result<SolverOutput, SolveError> {
        (**self).calibrate(samples, image_size)
    }
}

/// Linear planar calibration: per-view DLT homographies, Zhang's closed form
/// for `K`, then per-view pose recovery for the error report.
///
/// Distortion is not estimated and is reported as zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanarSolver;

impl PlanarSolver {
    pub const MIN_VIEWS: usize = 3;
}

impl IntrinsicsSolver for PlanarSolver {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, samples), fields(views = samples.len()))
    )]
    fn calibrate(
        &self,
        samples: &[CorrespondenceSet],
        image_size: ImageSize,
    ) -> Result<SolverOutput, SolveError> {
        if samples.len() < Self::MIN_VIEWS {
            return Err(SolveError::NotEnoughViews {
                needed: Self::MIN_VIEWS,
                got: samples.len(),
            });
        }

        let mut homographies = Vec::<Matrix3<f64>>::with_capacity(samples.len());
        for (view, sample) in samples.iter().enumerate() {
            if sample.len() < 4 {
                return Err(SolveError::NotEnoughPoints {
                    view,
                    got: sample.len(),
                });
            }
            if sample.object_points().iter().any(|p| p.z.abs() > 1e-9) {
                return Err(SolveError::NonPlanarTarget { view });
            }
            let plane: Vec<Point2<f64>> = sample
                .object_points()
                .iter()
                .map(|p| Point2::new(p.x, p.y))
                .collect();
            let h = estimate_homography(&plane, sample.image_points())
                .ok_or(SolveError::HomographyFailed { view })?;
            homographies.push(h.h);
        }

        let camera = estimate_intrinsics_from_homographies(&homographies, image_size)?;

        let mut per_view_errors = Vec::with_capacity(samples.len());
        for (view, sample) in samples.iter().enumerate() {
            let h = arcal_core::Homography::new(homographies[view]);
            let pose = planar_pose_from_homography(&camera, &h)
                .ok_or(SolveError::PoseFailed { view })?;
            let err = reprojection_rms(
                &camera,
                &pose,
                sample.object_points(),
                sample.image_points(),
            );
            log::debug!("view {view}: reprojection rms {err:.4} px");
            per_view_errors.push(err);
        }

        Ok(SolverOutput {
            camera,
            distortion: Distortion::zero(),
            per_view_errors,
        })
    }
}
