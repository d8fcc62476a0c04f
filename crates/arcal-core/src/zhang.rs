//! Closed-form intrinsics from plane homographies (Zhang, 2000).

use crate::{CameraMatrix, ImageSize, SolveError};
use nalgebra::{DMatrix, Matrix3, SVector};

/// Build the 6-vector `v_ij(H)` of Zhang's constraint `v_ij^T b = h_i^T B h_j`.
fn v_ij(h: &Matrix3<f64>, i: usize, j: usize) -> SVector<f64, 6> {
    let hi = h.column(i);
    let hj = h.column(j);

    SVector::<f64, 6>::from_row_slice(&[
        hi[0] * hj[0],
        hi[0] * hj[1] + hi[1] * hj[0],
        hi[1] * hj[1],
        hi[2] * hj[0] + hi[0] * hj[2],
        hi[2] * hj[1] + hi[1] * hj[2],
        hi[2] * hj[2],
    ])
}

/// Pixel normalisation mapping the image onto `[-1, 1]^2`.
fn image_normalization(size: ImageSize) -> Matrix3<f64> {
    let w = size.width as f64;
    let h = size.height as f64;
    Matrix3::new(2.0 / w, 0.0, -1.0, 0.0, 2.0 / h, -1.0, 0.0, 0.0, 1.0)
}

/// Estimate `K` from plane-to-image homographies (no distortion).
///
/// Homographies are conditioned with an image-size normalisation before the
/// SVD and `K` is mapped back to pixels afterwards. Needs at least 3 views
/// with non-parallel board planes.
pub fn estimate_intrinsics_from_homographies(
    homographies: &[Matrix3<f64>],
    image_size: ImageSize,
) -> Result<CameraMatrix, SolveError> {
    if homographies.len() < 3 {
        return Err(SolveError::NotEnoughViews {
            needed: 3,
            got: homographies.len(),
        });
    }
    if image_size.is_empty() {
        return Err(SolveError::InvalidImageSize {
            width: image_size.width,
            height: image_size.height,
        });
    }

    let n = image_normalization(image_size);
    let n_inv = n.try_inverse().ok_or(SolveError::Degenerate)?;

    let m = homographies.len();
    let mut vmtx = DMatrix::<f64>::zeros(2 * m, 6);
    for (k, h) in homographies.iter().enumerate() {
        let hn = n * h;
        let v11 = v_ij(&hn, 0, 0);
        let v22 = v_ij(&hn, 1, 1);
        let v12 = v_ij(&hn, 0, 1);
        vmtx.row_mut(2 * k).copy_from(&v12.transpose());
        vmtx.row_mut(2 * k + 1).copy_from(&(v11 - v22).transpose());
    }

    let svd = vmtx.svd(false, true);
    let v_t = svd.v_t.ok_or(SolveError::Degenerate)?;
    let (idx, _) = svd.singular_values.argmin();
    let b = v_t.row(idx);

    let (b11, b12, b22, b13, b23, b33) = (b[0], b[1], b[2], b[3], b[4], b[5]);

    // v0 = (B12 B13 - B11 B23) / (B11 B22 - B12^2)
    // λ  = B33 - (B13^2 + v0 (B12 B13 - B11 B23)) / B11
    // α  = sqrt(λ / B11)
    // β  = sqrt(λ B11 / (B11 B22 - B12^2))
    // γ  = -B12 α^2 β / λ
    // u0 = γ v0 / β - B13 α^2 / λ
    let denom = b11 * b22 - b12 * b12;
    let denom_norm = b11 * b11 + b22 * b22;
    if denom_norm <= 0.0 || denom.abs() / denom_norm <= 1e-9 || b11.abs() < 1e-15 {
        return Err(SolveError::Degenerate);
    }

    let v0 = (b12 * b13 - b11 * b23) / denom;
    let lambda = b33 - (b13 * b13 + v0 * (b12 * b13 - b11 * b23)) / b11;

    let alpha_sq = lambda / b11;
    let beta_sq = lambda * b11 / denom;
    if !(alpha_sq > 0.0 && beta_sq > 0.0) {
        return Err(SolveError::Degenerate);
    }

    let alpha = alpha_sq.sqrt();
    let beta = beta_sq.sqrt();
    let gamma = -b12 * alpha_sq * beta / lambda;
    let u0 = gamma * v0 / beta - b13 * alpha_sq / lambda;

    let k_norm = Matrix3::new(alpha, gamma, u0, 0.0, beta, v0, 0.0, 0.0, 1.0);
    let k = n_inv * k_norm;
    let s = k[(2, 2)];
    if s.abs() < 1e-12 || k.iter().any(|v| !v.is_finite()) {
        return Err(SolveError::Degenerate);
    }

    Ok(CameraMatrix::from_matrix(k / s))
}
