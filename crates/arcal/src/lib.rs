//! High-level facade crate for the `arcal-*` workspace.
//!
//! This crate provides stable, convenient re-exports of the math crate
//! (`arcal-core`) and the calibration session crate (`arcal-session`).
//!
//! ## Quickstart
//!
//! ```
//! use arcal::{
//!     CalibrationSession, CalibrationStore, BoardDetector, BoardSpec, MemoryStore,
//!     PlanarSolver, Pose, SessionError,
//! };
//! use arcal::nalgebra::{Matrix4, Point2};
//!
//! /// Stand-in for a real corner detector.
//! struct NoBoard;
//!
//! impl BoardDetector for NoBoard {
//!     type Frame = [u8];
//!
//!     fn find_board(&mut self, _: &[u8], _: &BoardSpec, _: &mut Vec<Point2<f64>>) -> bool {
//!         false
//!     }
//! }
//!
//! # fn main() -> Result<(), SessionError> {
//! let mut session = CalibrationSession::initialize(
//!     "webcam",
//!     BoardSpec::new(9, 6, 25.0)?,
//!     NoBoard,
//!     PlanarSolver,
//!     CalibrationStore::new(MemoryStore::new()),
//! )?;
//!
//! session.request_capture();
//! assert!(!session.process_frame(&[0u8; 16]).is_detected());
//!
//! // Nothing calibrated or stored yet.
//! let res = session.projection(1.0, &Pose::identity(), &Matrix4::identity());
//! assert!(matches!(res, Err(SessionError::NoCalibration)));
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `arcal::core`: camera/pose/board types, the projection pipeline, DLT
//!   homography, planar pose recovery, Zhang intrinsics, viewport fit, logger.
//! - `arcal::session`: sample capture, calibration session, persistence,
//!   session config.

pub use arcal_core as core;
pub use arcal_session as session;
pub use nalgebra;

pub use arcal_core::{
    compute_projection_matrix, init_with_level, BoardSpec, CameraMatrix, Distortion, ImageSize,
    Intrinsics, Pose, ProjectionMatrix, ViewportFit,
};
pub use arcal_session::{
    BoardDetector, CalibrationReport, CalibrationSession, CalibrationStore, DirectoryStore,
    FrameStatus, IntrinsicsSolver, KeyValueStore, MemoryStore, PlanarSolver, ProjectionBuilder,
    SessionConfig, SessionError,
};

#[cfg(feature = "tracing")]
pub use arcal_core::init_tracing;
