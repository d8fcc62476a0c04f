//! Pinhole intrinsics: camera matrix and lens distortion.

use crate::MatrixError;
use nalgebra::{Matrix3, Point2, Point3, Vector5};
use serde::{Deserialize, Serialize};

/// Image dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

fn check_len(values: &[f64], expected: usize) -> Result<(), MatrixError> {
    if values.len() != expected {
        return Err(MatrixError::InvalidDimension {
            expected,
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(MatrixError::NonFinite);
    }
    Ok(())
}

/// Camera matrix `K`:
///
/// ```text
/// | fx  s  cx |
/// |  0 fy  cy |
/// |  0  0   1 |
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMatrix {
    k: Matrix3<f64>,
}

impl CameraMatrix {
    /// Zero-skew camera matrix.
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self::from_matrix(Matrix3::new(fx, 0.0, cx, 0.0, fy, cy, 0.0, 0.0, 1.0))
    }

    pub fn from_matrix(k: Matrix3<f64>) -> Self {
        Self { k }
    }

    /// Build from 9 values in row-major order (the persisted layout).
    pub fn from_row_major(values: &[f64]) -> Result<Self, MatrixError> {
        check_len(values, 9)?;
        Ok(Self::from_matrix(Matrix3::from_row_slice(values)))
    }

    pub fn to_row_major(&self) -> [f64; 9] {
        let k = &self.k;
        [
            k[(0, 0)],
            k[(0, 1)],
            k[(0, 2)],
            k[(1, 0)],
            k[(1, 1)],
            k[(1, 2)],
            k[(2, 0)],
            k[(2, 1)],
            k[(2, 2)],
        ]
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.k
    }

    /// Focal length along x; also the focal length used by the AR projection.
    #[inline]
    pub fn fx(&self) -> f64 {
        self.k[(0, 0)]
    }

    #[inline]
    pub fn fy(&self) -> f64 {
        self.k[(1, 1)]
    }

    #[inline]
    pub fn cx(&self) -> f64 {
        self.k[(0, 2)]
    }

    #[inline]
    pub fn cy(&self) -> f64 {
        self.k[(1, 2)]
    }

    #[inline]
    pub fn skew(&self) -> f64 {
        self.k[(0, 1)]
    }

    /// Project a point given in camera coordinates onto the image plane.
    ///
    /// Returns `None` for points at or behind the camera centre.
    pub fn project(&self, p_cam: &Point3<f64>) -> Option<Point2<f64>> {
        if p_cam.z <= f64::EPSILON {
            return None;
        }
        let v = self.k * p_cam.coords;
        Some(Point2::new(v[0] / v[2], v[1] / v[2]))
    }
}

/// Distortion coefficients in OpenCV order `(k1, k2, p1, p2, k3)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Distortion {
    coeffs: Vector5<f64>,
}

impl Default for Distortion {
    fn default() -> Self {
        Self::zero()
    }
}

impl Distortion {
    pub fn zero() -> Self {
        Self {
            coeffs: Vector5::zeros(),
        }
    }

    pub fn new(k1: f64, k2: f64, p1: f64, p2: f64, k3: f64) -> Self {
        Self {
            coeffs: Vector5::new(k1, k2, p1, p2, k3),
        }
    }

    pub fn from_slice(values: &[f64]) -> Result<Self, MatrixError> {
        check_len(values, 5)?;
        Ok(Self {
            coeffs: Vector5::from_column_slice(values),
        })
    }

    pub fn to_array(&self) -> [f64; 5] {
        [
            self.coeffs[0],
            self.coeffs[1],
            self.coeffs[2],
            self.coeffs[3],
            self.coeffs[4],
        ]
    }

    #[inline]
    pub fn k1(&self) -> f64 {
        self.coeffs[0]
    }

    #[inline]
    pub fn k2(&self) -> f64 {
        self.coeffs[1]
    }

    #[inline]
    pub fn p1(&self) -> f64 {
        self.coeffs[2]
    }

    #[inline]
    pub fn p2(&self) -> f64 {
        self.coeffs[3]
    }

    #[inline]
    pub fn k3(&self) -> f64 {
        self.coeffs[4]
    }
}

/// Calibrated camera intrinsics.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intrinsics {
    pub camera: CameraMatrix,
    pub distortion: Distortion,
}

impl Intrinsics {
    pub fn new(camera: CameraMatrix, distortion: Distortion) -> Self {
        Self { camera, distortion }
    }

    /// Build from the flat persisted arrays (9 row-major + 5 values).
    pub fn from_arrays(camera_matrix: &[f64], dist_coeffs: &[f64]) -> Result<Self, MatrixError> {
        Ok(Self {
            camera: CameraMatrix::from_row_major(camera_matrix)?,
            distortion: Distortion::from_slice(dist_coeffs)?,
        })
    }
}
