//! Core types and math for chessboard calibration and AR overlays.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any corner detector, image type or persistence backend.
//!
//! - fixed-size camera types: [`CameraMatrix`], [`Distortion`], [`Intrinsics`], [`Pose`],
//! - board geometry and correspondences: [`BoardSpec`], [`CorrespondenceSet`],
//! - the projection pipeline: [`compute_projection_matrix`] and its builders,
//! - closed-form planar calibration helpers (homography, Zhang, pose recovery).

mod board;
mod camera;
mod error;
mod homography;
mod logger;
mod matrix_ops;
mod planar_pose;
mod pose;
mod viewport;
mod zhang;

pub use board::{BoardError, BoardSpec, CorrespondenceSet};
pub use camera::{CameraMatrix, Distortion, ImageSize, Intrinsics};
pub use error::{MatrixError, SolveError};
pub use homography::{estimate_homography, homography_from_4pt, Homography};
pub use matrix_ops::{
    compose, compute_projection_matrix, flip_yz, homogeneous_rotation, homogeneous_translation,
    matrix4_from_column_major, perspective_divide, viewport_scale, ProjectionMatrix,
};
pub use planar_pose::{planar_pose_from_homography, reprojection_rms};
pub use pose::Pose;
pub use viewport::ViewportFit;
pub use zhang::estimate_intrinsics_from_homographies;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
