//! Chessboard geometry and per-view correspondences.

use crate::MatrixError;
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Static chessboard specification.
///
/// `cols`/`rows` are **inner corner counts**, `pitch` is the square size in
/// millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSpec {
    pub cols: u32,
    pub rows: u32,
    pub pitch: f64,
}

impl Default for BoardSpec {
    fn default() -> Self {
        Self {
            cols: 9,
            rows: 6,
            pitch: 25.0,
        }
    }
}

/// Board specification validation errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BoardError {
    #[error("cols and rows must be >= 1 (got {cols}x{rows})")]
    InvalidSize { cols: u32, rows: u32 },
    #[error("pitch must be finite and > 0 (got {0})")]
    InvalidPitch(f64),
}

impl BoardSpec {
    pub fn new(cols: u32, rows: u32, pitch: f64) -> Result<Self, BoardError> {
        let spec = Self { cols, rows, pitch };
        spec.validate()?;
        Ok(spec)
    }

    pub fn validate(&self) -> Result<(), BoardError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(BoardError::InvalidSize {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !self.pitch.is_finite() || self.pitch <= 0.0 {
            return Err(BoardError::InvalidPitch(self.pitch));
        }
        Ok(())
    }

    /// Number of inner corners a full detection reports.
    #[inline]
    pub fn corner_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }

    /// Object-space corner positions in detector scan order.
    ///
    /// Row-major: for row `j`, column `i` the point is `(pitch*i, pitch*j, 0)`.
    pub fn object_points(&self) -> Vec<Point3<f64>> {
        let mut out = Vec::with_capacity(self.corner_count());
        for j in 0..self.rows {
            for i in 0..self.cols {
                out.push(Point3::new(
                    self.pitch * i as f64,
                    self.pitch * j as f64,
                    0.0,
                ));
            }
        }
        out
    }
}

/// One calibration sample: detected image corners paired index-for-index with
/// the board's object points.
///
/// Object points are shared between samples; they come from one template.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrespondenceSet {
    image_points: Vec<Point2<f64>>,
    object_points: Arc<[Point3<f64>]>,
}

impl CorrespondenceSet {
    pub fn new(
        image_points: Vec<Point2<f64>>,
        object_points: Arc<[Point3<f64>]>,
    ) -> Result<Self, MatrixError> {
        if image_points.len() != object_points.len() {
            return Err(MatrixError::InvalidDimension {
                expected: object_points.len(),
                got: image_points.len(),
            });
        }
        Ok(Self {
            image_points,
            object_points,
        })
    }

    #[inline]
    pub fn image_points(&self) -> &[Point2<f64>] {
        &self.image_points
    }

    #[inline]
    pub fn object_points(&self) -> &[Point3<f64>] {
        &self.object_points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.image_points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.image_points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_points_are_row_major() {
        let spec = BoardSpec::default();
        let pts = spec.object_points();
        assert_eq!(pts.len(), 54);
        assert_eq!(pts[0], Point3::new(0.0, 0.0, 0.0));
        assert_eq!(pts[1], Point3::new(25.0, 0.0, 0.0));
        assert_eq!(pts[8], Point3::new(200.0, 0.0, 0.0));
        assert_eq!(pts[9], Point3::new(0.0, 25.0, 0.0));
        assert_eq!(pts[53], Point3::new(200.0, 125.0, 0.0));
    }

    #[test]
    fn spec_reads_from_json() {
        let spec: BoardSpec =
            serde_json::from_str(r#"{"cols": 7, "rows": 5, "pitch": 30.0}"#).expect("json");
        assert_eq!(spec, BoardSpec::new(7, 5, 30.0).expect("valid"));
        assert_eq!(spec.corner_count(), 35);
    }

    #[test]
    fn invalid_specs_are_rejected() {
        assert!(matches!(
            BoardSpec::new(0, 6, 25.0),
            Err(BoardError::InvalidSize { .. })
        ));
        assert!(matches!(
            BoardSpec::new(9, 6, 0.0),
            Err(BoardError::InvalidPitch(_))
        ));
        assert!(matches!(
            BoardSpec::new(9, 6, f64::INFINITY),
            Err(BoardError::InvalidPitch(_))
        ));
    }

    #[test]
    fn correspondence_lengths_must_match() {
        let template: Arc<[Point3<f64>]> = BoardSpec::new(2, 2, 1.0)
            .expect("board")
            .object_points()
            .into();
        let short = vec![Point2::new(0.0, 0.0); 3];
        assert_eq!(
            CorrespondenceSet::new(short, template.clone()),
            Err(MatrixError::InvalidDimension {
                expected: 4,
                got: 3
            })
        );
        let set = CorrespondenceSet::new(vec![Point2::new(0.0, 0.0); 4], template).expect("set");
        assert_eq!(set.len(), 4);
        assert_eq!(set.object_points()[3], Point3::new(1.0, 1.0, 0.0));
    }
}
