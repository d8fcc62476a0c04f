//! Calibration lifecycle: detect, capture, solve, persist, project.

use crate::{
    BoardDetector, CalibrationStore, IntrinsicsSolver, KeyValueStore, ProjectionBuilder,
    SampleCollector, SessionConfig, SessionError,
};
use arcal_core::{
    BoardSpec, CorrespondenceSet, ImageSize, Intrinsics, Pose, ProjectionMatrix,
};
use nalgebra::{Matrix4, Point2, Point3};
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Outcome of feeding one frame to the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// No complete board in the frame. A normal per-frame outcome.
    NoBoard,
    Detected {
        /// `true` when an armed capture consumed this detection.
        captured: bool,
        corner_count: usize,
    },
}

impl FrameStatus {
    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected { .. })
    }
}

/// Result of a successful [`CalibrationSession::calibrate`].
#[derive(Clone, Debug, PartialEq)]
pub struct CalibrationReport {
    pub intrinsics: Intrinsics,
    /// RMS reprojection error per captured sample, in pixels.
    pub per_view_errors: Vec<f64>,
    /// RMS reprojection error over all samples, in pixels.
    pub rms: f64,
    /// `false` when the store rejected the write; the intrinsics are still
    /// held for this session.
    pub persisted: bool,
}

/// Owns every piece of calibration state for one camera profile.
///
/// `D` finds corners, `S` solves for intrinsics, `K` persists them. All
/// mutation goes through `&mut self`, so frames cannot be captured while a
/// solve is reading the samples.
#[derive(Debug)]
pub struct CalibrationSession<D, S, K> {
    profile: String,
    board: BoardSpec,
    min_samples: usize,
    template: Arc<[Point3<f64>]>,
    detector: D,
    solver: S,
    store: CalibrationStore<K>,
    collector: SampleCollector,
    corners: Vec<Point2<f64>>,
    intrinsics: Option<Intrinsics>,
}

impl<D, S, K> CalibrationSession<D, S, K>
where
    D: BoardDetector,
    S: IntrinsicsSolver,
    K: KeyValueStore,
{
    /// Default capture threshold for [`calibrate`](Self::calibrate).
    pub const DEFAULT_MIN_SAMPLES: usize = 5;

    /// Build the object-point template for `board` and restore any intrinsics
    /// stored under `profile`.
    ///
    /// A store read failure is logged and the session starts uncalibrated.
    pub fn initialize(
        profile: impl Into<String>,
        board: BoardSpec,
        detector: D,
        solver: S,
        store: CalibrationStore<K>,
    ) -> Result<Self, SessionError> {
        board.validate()?;
        let profile = profile.into();
        let template: Arc<[Point3<f64>]> = board.object_points().into();

        let intrinsics = match store.load(&profile) {
            Ok(Some(intrinsics)) => {
                log::info!("loaded calibration for profile '{profile}'");
                Some(intrinsics)
            }
            Ok(None) => {
                log::info!("no stored calibration for profile '{profile}'");
                None
            }
            Err(err) => {
                log::warn!("failed to load calibration for profile '{profile}': {err}");
                None
            }
        };

        Ok(Self {
            profile,
            board,
            min_samples: Self::DEFAULT_MIN_SAMPLES,
            template,
            detector,
            solver,
            store,
            collector: SampleCollector::new(),
            corners: Vec::with_capacity(board.corner_count()),
            intrinsics,
        })
    }

    /// [`initialize`](Self::initialize) with profile, board and threshold
    /// taken from `config`.
    pub fn from_config(
        config: &SessionConfig,
        detector: D,
        solver: S,
        store: CalibrationStore<K>,
    ) -> Result<Self, SessionError> {
        let board = config.build_board()?;
        Ok(
            Self::initialize(config.profile.clone(), board, detector, solver, store)?
                .with_min_samples(config.effective_min_samples()),
        )
    }

    /// Override the capture threshold; values below 1 are raised to 1.
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples.max(1);
        self
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn board(&self) -> &BoardSpec {
        &self.board
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Object points shared by every captured sample.
    pub fn object_points(&self) -> &[Point3<f64>] {
        &self.template
    }

    pub fn collector(&self) -> &SampleCollector {
        &self.collector
    }

    pub fn intrinsics(&self) -> Option<&Intrinsics> {
        self.intrinsics.as_ref()
    }

    pub fn is_calibrated(&self) -> bool {
        self.intrinsics.is_some()
    }

    /// Corners of the most recent frame, if it held a board.
    pub fn last_corners(&self) -> Option<&[Point2<f64>]> {
        if self.corners.is_empty() {
            None
        } else {
            Some(&self.corners)
        }
    }

    pub fn store_backend(&self) -> &K {
        self.store.backend()
    }

    /// Run detection on one frame and hand the result to the collector.
    ///
    /// A detection whose corner count does not match the board is treated as
    /// no board. The scratch buffer is emptied whenever no board is reported.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn process_frame(&mut self, frame: &D::Frame) -> FrameStatus {
        self.corners.clear();
        if !self
            .detector
            .find_board(frame, &self.board, &mut self.corners)
        {
            self.corners.clear();
            return FrameStatus::NoBoard;
        }

        let expected = self.template.len();
        if self.corners.len() != expected {
            log::warn!(
                "detector returned {} corners, board has {expected}; ignoring frame",
                self.corners.len()
            );
            self.corners.clear();
            return FrameStatus::NoBoard;
        }

        let captured = self.collector.is_armed() && self.capture_current();

        FrameStatus::Detected {
            captured,
            corner_count: expected,
        }
    }

    /// Hand the scratch corners to the armed collector.
    fn capture_current(&mut self) -> bool {
        match CorrespondenceSet::new(self.corners.clone(), Arc::clone(&self.template)) {
            Ok(set) => {
                let captured = self.collector.on_detection(set);
                if captured {
                    log::info!("captured sample {}", self.collector.count());
                }
                captured
            }
            Err(err) => {
                log::warn!("detection not captured: {err}");
                false
            }
        }
    }

    /// Capture the next detected board.
    pub fn request_capture(&mut self) {
        self.collector.arm();
    }

    /// Drop all captured samples and disarm.
    pub fn reset_samples(&mut self) {
        self.collector.reset();
    }

    /// Solve for intrinsics from the captured samples and persist them.
    ///
    /// On failure the previously held intrinsics are kept. A failed write to
    /// the store does not fail the calibration; it is reported through
    /// [`CalibrationReport::persisted`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self), fields(profile = %self.profile))
    )]
    pub fn calibrate(&mut self, image_size: ImageSize) -> Result<CalibrationReport, SessionError> {
        let have = self.collector.count();
        if have < self.min_samples {
            return Err(SessionError::InsufficientSamples {
                have,
                need: self.min_samples,
            });
        }

        log::info!(
            "calibrating '{}' from {have} samples at {}x{}",
            self.profile,
            image_size.width,
            image_size.height
        );
        let output = self
            .solver
            .calibrate(self.collector.samples(), image_size)
            .map_err(|err| {
                log::warn!("calibration failed: {err}");
                SessionError::CalibrationFailed(err)
            })?;

        let rms = output.rms();
        let intrinsics = Intrinsics::new(output.camera, output.distortion);
        log::info!(
            "calibrated fx={:.3} fy={:.3} cx={:.3} cy={:.3} rms={rms:.4}px",
            intrinsics.camera.fx(),
            intrinsics.camera.fy(),
            intrinsics.camera.cx(),
            intrinsics.camera.cy()
        );
        self.intrinsics = Some(intrinsics);

        let persisted = match self.store.save(&self.profile, &intrinsics) {
            Ok(()) => true,
            Err(err) => {
                log::warn!(
                    "calibration for '{}' not persisted: {err}",
                    self.profile
                );
                false
            }
        };

        Ok(CalibrationReport {
            intrinsics,
            per_view_errors: output.per_view_errors,
            rms,
            persisted,
        })
    }

    /// Persist the held intrinsics. `Ok(false)` when there is nothing to
    /// store.
    pub fn store(&mut self) -> Result<bool, SessionError> {
        let Some(intrinsics) = self.intrinsics.as_ref() else {
            return Ok(false);
        };
        self.store.save(&self.profile, intrinsics)?;
        Ok(true)
    }

    /// Replace the held intrinsics with the stored ones. `Ok(false)` leaves
    /// the session unchanged when nothing is stored.
    pub fn reload(&mut self) -> Result<bool, SessionError> {
        match self.store.load(&self.profile)? {
            Some(intrinsics) => {
                self.intrinsics = Some(intrinsics);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Forget the held intrinsics without touching the store. Returns whether
    /// any were held.
    pub fn clear_calibration(&mut self) -> bool {
        self.intrinsics.take().is_some()
    }

    pub fn projection_builder(&self) -> ProjectionBuilder<'_> {
        ProjectionBuilder::new(self.intrinsics.as_ref())
    }

    /// Shorthand for `projection_builder().build(..)`.
    pub fn projection(
        &self,
        ratio: f64,
        pose: &Pose,
        view: &Matrix4<f64>,
    ) -> Result<ProjectionMatrix, SessionError> {
        self.projection_builder().build(ratio, pose, view)
    }

    /// Release the scratch buffer, the samples and the held intrinsics.
    ///
    /// Safe to call repeatedly. The session stays usable and starts over
    /// uncalibrated.
    pub fn teardown(&mut self) {
        self.corners = Vec::new();
        self.collector.release();
        if self.intrinsics.take().is_some() {
            log::debug!("released calibration for '{}'", self.profile);
        }
    }
}
