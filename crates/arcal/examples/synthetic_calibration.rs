use arcal::nalgebra::{Matrix4, Point2, Vector3};
use arcal::{
    BoardDetector, BoardSpec, CalibrationSession, CalibrationStore, CameraMatrix, DirectoryStore,
    ImageSize, PlanarSolver, Pose, ViewportFit,
};

#[cfg(feature = "tracing")]
use arcal::init_tracing;
#[cfg(not(feature = "tracing"))]
use arcal::init_with_level;
#[cfg(not(feature = "tracing"))]
use log::LevelFilter;

/// Projects the board through a known camera instead of reading video.
struct Simulated(CameraMatrix);

impl BoardDetector for Simulated {
    type Frame = Pose;

    fn find_board(&mut self, pose: &Pose, board: &BoardSpec, out: &mut Vec<Point2<f64>>) -> bool {
        for p in board.object_points() {
            let Some(px) = self.0.project(&pose.transform_point(&p)) else {
                return false;
            };
            out.push(px);
        }
        true
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    init_tracing(false);
    #[cfg(not(feature = "tracing"))]
    init_with_level(LevelFilter::Info)?;

    let store_dir = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "arcal_profiles".to_owned());

    let image = ImageSize::new(640, 480);
    let mut session = CalibrationSession::initialize(
        "simulated",
        BoardSpec::default(),
        Simulated(CameraMatrix::new(800.0, 800.0, 320.0, 240.0)),
        PlanarSolver,
        CalibrationStore::new(DirectoryStore::new(&store_dir)),
    )?;

    for (k, tilt) in [0.3, -0.25, 0.2, -0.3, 0.35, -0.2].into_iter().enumerate() {
        let axis = if k % 2 == 0 {
            Vector3::new(tilt, 0.1, 0.0)
        } else {
            Vector3::new(0.1, tilt, 0.05)
        };
        let pose = Pose::from_rotation_vector(axis, Vector3::new(-100.0, -62.5, 600.0));
        session.request_capture();
        println!("frame {k}: {:?}", session.process_frame(&pose));
    }

    let report = session.calibrate(image)?;
    let k = report.intrinsics.camera;
    println!(
        "fx={:.2} fy={:.2} cx={:.2} cy={:.2} rms={:.4}px persisted={}",
        k.fx(),
        k.fy(),
        k.cx(),
        k.cy(),
        report.rms,
        report.persisted
    );

    if let Some(fit) = ViewportFit::contain(ImageSize::new(1280, 720), image) {
        let m = session.projection(fit.ratio, &Pose::identity(), &Matrix4::identity())?;
        println!("projection (column-major): {:?}", m.to_column_major());
    }

    Ok(())
}
