//! Chessboard calibration session for AR overlays.
//!
//! Current focus:
//! - arming and capturing board detections as calibration samples,
//! - solving for intrinsics through a pluggable solver (planar Zhang by default),
//! - persisting intrinsics per camera profile,
//! - building the per-frame projection matrix from the held intrinsics.
//!
//! Corner detection is supplied by the caller through [`BoardDetector`].

mod collector;
mod config;
mod detector;
mod error;
mod projection;
mod session;
mod solver;
mod store;

pub use collector::SampleCollector;
pub use config::{ConfigIoError, SessionConfig};
pub use detector::BoardDetector;
pub use error::SessionError;
pub use projection::ProjectionBuilder;
pub use session::{CalibrationReport, CalibrationSession, FrameStatus};
pub use solver::{IntrinsicsSolver, PlanarSolver, SolverOutput};
pub use store::{
    calibration_key, CalibrationStore, DirectoryStore, KeyValueStore, MemoryStore,
    PersistedCalibration, StoreError,
};
