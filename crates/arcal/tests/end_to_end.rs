use approx::assert_relative_eq;
use arcal::core::ViewportFit;
use arcal::nalgebra::{Matrix4, Point2, Vector3};
use arcal::{
    BoardDetector, BoardSpec, CalibrationSession, CalibrationStore, CameraMatrix, DirectoryStore,
    FrameStatus, ImageSize, MemoryStore, PlanarSolver, Pose, SessionConfig, SessionError,
};

const IMAGE: ImageSize = ImageSize {
    width: 640,
    height: 480,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn ground_truth() -> CameraMatrix {
    CameraMatrix::new(800.0, 800.0, 320.0, 240.0)
}

fn board() -> BoardSpec {
    BoardSpec::new(9, 6, 25.0).expect("board")
}

/// Six board poses roughly centred in front of the camera.
fn poses() -> Vec<Pose> {
    [
        ([0.30, 0.00, 0.00], 560.0),
        ([0.00, 0.30, 0.00], 600.0),
        ([-0.25, 0.20, 0.10], 620.0),
        ([0.20, -0.30, -0.10], 650.0),
        ([0.35, 0.25, 0.05], 580.0),
        ([-0.30, -0.20, 0.20], 700.0),
    ]
    .into_iter()
    .map(|(r, z)| {
        Pose::from_rotation_vector(
            Vector3::new(r[0], r[1], r[2]),
            Vector3::new(-100.0, -62.5, z),
        )
    })
    .collect()
}

/// Renders the board analytically: the "frame" is the board pose.
struct SyntheticDetector {
    camera: CameraMatrix,
}

impl BoardDetector for SyntheticDetector {
    type Frame = Pose;

    fn find_board(
        &mut self,
        frame: &Pose,
        board: &BoardSpec,
        corners: &mut Vec<Point2<f64>>,
    ) -> bool {
        for p in board.object_points() {
            match self.camera.project(&frame.transform_point(&p)) {
                Some(px) => corners.push(px),
                None => return false,
            }
        }
        true
    }
}

fn capture_all<K: arcal::KeyValueStore>(
    session: &mut CalibrationSession<SyntheticDetector, PlanarSolver, K>,
    poses: &[Pose],
) {
    for pose in poses {
        session.request_capture();
        assert_eq!(
            session.process_frame(pose),
            FrameStatus::Detected {
                captured: true,
                corner_count: 54
            }
        );
    }
}

#[test]
fn calibrates_synthetic_views_and_persists_across_sessions() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let poses = poses();

    let mut session = CalibrationSession::initialize(
        "webcam",
        board(),
        SyntheticDetector {
            camera: ground_truth(),
        },
        PlanarSolver,
        CalibrationStore::new(DirectoryStore::new(dir.path())),
    )
    .expect("session");
    assert!(!session.is_calibrated());
    capture_all(&mut session, &poses);
    assert_eq!(session.collector().count(), 6);

    let report = session.calibrate(IMAGE).expect("calibrate");
    assert!(report.persisted);
    assert!(report.rms < 1.0, "rms {}", report.rms);
    assert_eq!(report.per_view_errors.len(), 6);

    let k = report.intrinsics.camera;
    assert_relative_eq!(k.fx(), 800.0, max_relative = 1e-4);
    assert_relative_eq!(k.fy(), 800.0, max_relative = 1e-4);
    assert_relative_eq!(k.cx(), 320.0, max_relative = 1e-4);
    assert_relative_eq!(k.cy(), 240.0, max_relative = 1e-4);

    // Re-project the board through the calibrated camera at the true poses.
    let obj = board().object_points();
    let mut sq = 0.0;
    let mut n = 0usize;
    for pose in &poses {
        let mut observed = Vec::new();
        assert!(SyntheticDetector {
            camera: ground_truth()
        }
        .find_board(pose, &board(), &mut observed));
        for (p, seen) in obj.iter().zip(&observed) {
            let px = k.project(&pose.transform_point(p)).expect("in front");
            sq += (px - seen).norm_squared();
            n += 1;
        }
    }
    assert!((sq / n as f64).sqrt() < 1.0);

    let raw = std::fs::read_to_string(dir.path().join("webcam").join("calibration.json"))
        .expect("persisted file");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(json["cameraMatrix"].as_array().map(Vec::len), Some(9));
    assert_eq!(json["distCoeffs"].as_array().map(Vec::len), Some(5));

    let restored = CalibrationSession::initialize(
        "webcam",
        board(),
        SyntheticDetector {
            camera: ground_truth(),
        },
        PlanarSolver,
        CalibrationStore::new(DirectoryStore::new(dir.path())),
    )
    .expect("restored session");
    let loaded = restored.intrinsics().expect("loaded from disk");
    for (a, b) in loaded
        .camera
        .to_row_major()
        .into_iter()
        .zip(k.to_row_major())
    {
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}

#[test]
fn projection_requires_calibration() {
    init_logging();
    let session = CalibrationSession::initialize(
        "fresh",
        board(),
        SyntheticDetector {
            camera: ground_truth(),
        },
        PlanarSolver,
        CalibrationStore::new(MemoryStore::new()),
    )
    .expect("session");
    assert!(matches!(
        session.projection(1.0, &Pose::identity(), &Matrix4::identity()),
        Err(SessionError::NoCalibration)
    ));
}

#[test]
fn too_few_samples_keep_previous_intrinsics() {
    init_logging();
    let poses = poses();
    let mut session = CalibrationSession::initialize(
        "webcam",
        board(),
        SyntheticDetector {
            camera: ground_truth(),
        },
        PlanarSolver,
        CalibrationStore::new(MemoryStore::new()),
    )
    .expect("session");
    capture_all(&mut session, &poses);
    let first = session.calibrate(IMAGE).expect("calibrate").intrinsics;

    session.reset_samples();
    capture_all(&mut session, &poses[..2]);
    assert!(matches!(
        session.calibrate(IMAGE),
        Err(SessionError::InsufficientSamples { have: 2, need: 5 })
    ));
    assert_eq!(session.intrinsics(), Some(&first));
}

#[test]
fn letterboxed_projection_scales_principal_point() {
    init_logging();
    let mut session = CalibrationSession::initialize(
        "display",
        board(),
        SyntheticDetector {
            camera: ground_truth(),
        },
        PlanarSolver,
        CalibrationStore::new(MemoryStore::new()),
    )
    .expect("session");
    capture_all(&mut session, &poses());
    let k = session.calibrate(IMAGE).expect("calibrate").intrinsics.camera;

    let fit = ViewportFit::contain(ImageSize::new(1280, 1080), IMAGE).expect("fit");
    assert_relative_eq!(fit.ratio, 2.0);
    assert_relative_eq!(fit.offset_y, 60.0);

    let m = session
        .projection(fit.ratio, &Pose::identity(), &Matrix4::identity())
        .expect("projection")
        .to_column_major();
    assert_relative_eq!(m[12], k.cx() * 2.0);
    assert_relative_eq!(m[13], k.cy() * 2.0);
    assert_relative_eq!(m[15], 1.0);
    assert_relative_eq!(m[11], -1.0 / k.fx());
}

#[test]
fn config_file_drives_session() {
    init_logging();
    let dir = tempfile::tempdir().expect("tempdir");
    let cfg_path = dir.path().join("session.json");
    let store_dir = dir.path().join("profiles");
    let cfg = SessionConfig {
        profile: "bench".to_owned(),
        board: board(),
        min_samples: 6,
        store_dir: Some(store_dir.to_string_lossy().into_owned()),
    };
    cfg.write_json(&cfg_path).expect("write config");

    let cfg = SessionConfig::load_json(&cfg_path).expect("load config");
    let store = cfg.build_store().expect("store configured");
    let mut session = CalibrationSession::from_config(
        &cfg,
        SyntheticDetector {
            camera: ground_truth(),
        },
        PlanarSolver,
        store,
    )
    .expect("session");
    capture_all(&mut session, &poses());
    assert!(session.calibrate(IMAGE).expect("calibrate").persisted);
    assert!(store_dir.join("bench").join("calibration.json").is_file());
}
