use crate::{CameraMatrix, Homography, Pose};
use nalgebra::{Matrix3, Point2, Point3, Vector3};

/// Decompose a plane-induced homography into the board pose `T_C_B`.
///
/// The board lies on `Z = 0` in its own frame. Returns `None` when `K` is
/// singular or the homography columns collapse.
pub fn planar_pose_from_homography(camera: &CameraMatrix, h: &Homography) -> Option<Pose> {
    let k_inv = camera.matrix().try_inverse()?;

    let k_inv_h1 = k_inv * h.h.column(0);
    let k_inv_h2 = k_inv * h.h.column(1);
    let k_inv_h3 = k_inv * h.h.column(2);

    let mean_norm = (k_inv_h1.norm() + k_inv_h2.norm()) * 0.5;
    if mean_norm < 1e-12 {
        return None;
    }
    let mut lambda = 1.0 / mean_norm;
    // the board must sit in front of the camera
    if k_inv_h3[2] * lambda < 0.0 {
        lambda = -lambda;
    }

    let r1 = k_inv_h1 * lambda;
    let r2 = k_inv_h2 * lambda;
    let r3 = r1.cross(&r2);

    let mut r = Matrix3::<f64>::zeros();
    r.set_column(0, &r1);
    r.set_column(1, &r2);
    r.set_column(2, &r3);

    // closest rotation in the Frobenius sense
    let svd = r.svd(true, true);
    let u = svd.u?;
    let v_t = svd.v_t?;
    let mut r_orth = u * v_t;
    if r_orth.determinant() < 0.0 {
        let mut u_flipped = u;
        u_flipped.column_mut(2).neg_mut();
        r_orth = u_flipped * v_t;
    }

    let t: Vector3<f64> = k_inv_h3 * lambda;
    Some(Pose::new(r_orth, t))
}

/// RMS pixel distance between observed corners and object points projected
/// through `camera` at `pose`. Points that project behind the camera count
/// as infinite error.
pub fn reprojection_rms(
    camera: &CameraMatrix,
    pose: &Pose,
    object_points: &[Point3<f64>],
    image_points: &[Point2<f64>],
) -> f64 {
    let n = object_points.len().min(image_points.len());
    if n == 0 {
        return 0.0;
    }
    let mut sum_sq = 0.0;
    for (obj, img) in object_points.iter().zip(image_points) {
        match camera.project(&pose.transform_point(obj)) {
            Some(p) => sum_sq += (p - img).norm_squared(),
            None => return f64::INFINITY,
        }
    }
    (sum_sq / n as f64).sqrt()
}
