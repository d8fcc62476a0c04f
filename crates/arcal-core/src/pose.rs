use crate::MatrixError;
use nalgebra::{Matrix3, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid transform mapping board coordinates into camera coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    rotation: Matrix3<f64>,
    translation: Vector3<f64>,
}

impl Pose {
    pub fn new(rotation: Matrix3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity(), Vector3::zeros())
    }

    /// Build from a row-major 3x3 rotation and a 3-vector, as pose estimators
    /// usually hand them over.
    pub fn from_row_major(rotation: &[f64], translation: &[f64]) -> Result<Self, MatrixError> {
        if rotation.len() != 9 {
            return Err(MatrixError::InvalidDimension {
                expected: 9,
                got: rotation.len(),
            });
        }
        if translation.len() != 3 {
            return Err(MatrixError::InvalidDimension {
                expected: 3,
                got: translation.len(),
            });
        }
        Ok(Self::new(
            Matrix3::from_row_slice(rotation),
            Vector3::from_column_slice(translation),
        ))
    }

    /// Build from an axis-angle rotation vector (Rodrigues form).
    pub fn from_rotation_vector(rvec: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self::new(*Rotation3::new(rvec).matrix(), translation)
    }

    #[inline]
    pub fn rotation(&self) -> &Matrix3<f64> {
        &self.rotation
    }

    #[inline]
    pub fn translation(&self) -> &Vector3<f64> {
        &self.translation
    }

    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * p.coords + self.translation)
    }
}
