//! Homogeneous transform builders and the AR projection pipeline.
//!
//! All matrices use mathematical `(row, col)` indexing with column vectors,
//! so in `a * b` the right operand is applied first. Renderers receive the
//! 16 values in column-major order (see [`ProjectionMatrix::to_column_major`]).
//! In that flat layout a translation occupies elements 12..15, i.e. the
//! "last row" of the array as written out by GL-style matrix libraries.

use crate::{CameraMatrix, MatrixError};
use nalgebra::{Matrix3, Matrix4, Vector3};

/// 4x4 projection matrix ready for a real-time renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectionMatrix {
    m: Matrix4<f64>,
}

impl ProjectionMatrix {
    pub fn new(m: Matrix4<f64>) -> Self {
        Self { m }
    }

    #[inline]
    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.m
    }

    /// Element at mathematical `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.m[(row, col)]
    }

    /// The 16 values in the renderer's column-major order.
    pub fn to_column_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.m.as_slice());
        out
    }

    /// Single-precision copy for GPU uniform upload.
    pub fn to_column_major_f32(&self) -> [f32; 16] {
        self.to_column_major().map(|v| v as f32)
    }
}

/// Read a renderer matrix (e.g. the scene's view matrix) from 16
/// column-major values.
pub fn matrix4_from_column_major(values: &[f64]) -> Result<Matrix4<f64>, MatrixError> {
    if values.len() != 16 {
        return Err(MatrixError::InvalidDimension {
            expected: 16,
            got: values.len(),
        });
    }
    Ok(Matrix4::from_column_slice(values))
}

/// `diag(1, -1, -1, 1)`: vision axes (y down, z forward) to renderer axes.
pub fn flip_yz() -> Matrix4<f64> {
    Matrix4::from_diagonal(&nalgebra::Vector4::new(1.0, -1.0, -1.0, 1.0))
}

/// Embed a 3x3 rotation in the upper-left block of a homogeneous transform.
pub fn homogeneous_rotation(rotation: &Matrix3<f64>) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(rotation);
    m
}

pub fn homogeneous_translation(translation: &Vector3<f64>) -> Matrix4<f64> {
    Matrix4::new_translation(translation)
}

/// First-order pinhole divide: `w' = w + z / focal_length`.
///
/// Identity except for flat element 11 (row 3, column 2).
pub fn perspective_divide(focal_length: f64) -> Matrix4<f64> {
    let mut m = Matrix4::identity();
    m[(3, 2)] = 1.0 / focal_length;
    m
}

/// Uniform display scale plus the scaled principal-point offset.
pub fn viewport_scale(ratio: f64, cx: f64, cy: f64) -> Matrix4<f64> {
    let mut m = Matrix4::from_diagonal(&nalgebra::Vector4::new(ratio, ratio, ratio, 1.0));
    m[(0, 3)] = cx * ratio;
    m[(1, 3)] = cy * ratio;
    m
}

/// `a * b`; `b` is applied first.
#[inline]
pub fn compose(a: &Matrix4<f64>, b: &Matrix4<f64>) -> Matrix4<f64> {
    a * b
}

/// Build the AR projection matrix for one frame.
///
/// The composition order is fixed:
///
/// ```text
/// scale * persp * view * trans * (rot * flip)
/// ```
///
/// Reordering any factor misaligns the overlay.
pub fn compute_projection_matrix(
    ratio: f64,
    camera: &CameraMatrix,
    rotation: &Matrix3<f64>,
    translation: &Vector3<f64>,
    view: &Matrix4<f64>,
) -> ProjectionMatrix {
    let step1 = compose(&homogeneous_rotation(rotation), &flip_yz());
    let step2 = compose(&homogeneous_translation(translation), &step1);
    let step3 = compose(view, &step2);
    let step4 = compose(&perspective_divide(camera.fx()), &step3);
    let result = compose(&viewport_scale(ratio, camera.cx(), camera.cy()), &step4);
    ProjectionMatrix::new(result)
}
