//! Armed/idle capture of calibration samples.

use arcal_core::CorrespondenceSet;

/// Accumulates correspondence sets in capture order.
///
/// A two-state machine: `arm` moves it to armed, a successful
/// [`on_detection`](Self::on_detection) appends one sample and returns it to
/// idle.
#[derive(Clone, Debug, Default)]
pub struct SampleCollector {
    samples: Vec<CorrespondenceSet>,
    armed: bool,
}

impl SampleCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the next successful detection. Idempotent.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Offer a detection; it is kept only when armed.
    pub fn on_detection(&mut self, set: CorrespondenceSet) -> bool {
        if !self.armed {
            return false;
        }
        self.samples.push(set);
        self.armed = false;
        true
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn samples(&self) -> &[CorrespondenceSet] {
        &self.samples
    }

    /// Drop all samples and disarm.
    pub fn reset(&mut self) {
        self.samples.clear();
        self.armed = false;
    }

    /// Like [`reset`](Self::reset), and also frees the sample allocation.
    pub(crate) fn release(&mut self) {
        self.samples = Vec::new();
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcal_core::BoardSpec;
    use nalgebra::{Point2, Point3};
    use std::sync::Arc;

    fn sample(offset: f64) -> CorrespondenceSet {
        let template: Arc<[Point3<f64>]> = BoardSpec::new(2, 1, 10.0)
            .expect("board")
            .object_points()
            .into();
        CorrespondenceSet::new(
            vec![Point2::new(offset, 0.0), Point2::new(offset + 10.0, 0.0)],
            template,
        )
        .expect("sample")
    }

    #[test]
    fn armed_capture_then_idle() {
        let mut c = SampleCollector::new();
        c.arm();
        assert!(c.on_detection(sample(0.0)));
        assert_eq!(c.count(), 1);
        assert!(!c.is_armed());

        assert!(!c.on_detection(sample(5.0)));
        assert_eq!(c.count(), 1);
        assert_eq!(c.samples()[0].image_points()[0], Point2::new(0.0, 0.0));
    }

    #[test]
    fn arm_is_idempotent() {
        let mut c = SampleCollector::new();
        c.arm();
        c.arm();
        assert!(c.on_detection(sample(0.0)));
        assert!(!c.on_detection(sample(1.0)));
        assert_eq!(c.count(), 1);
    }

    #[test]
    fn unarmed_detection_is_ignored() {
        let mut c = SampleCollector::new();
        assert!(!c.on_detection(sample(0.0)));
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn samples_keep_insertion_order_and_reset_clears() {
        let mut c = SampleCollector::new();
        for k in 0..3 {
            c.arm();
            assert!(c.on_detection(sample(k as f64)));
        }
        let xs: Vec<f64> = c.samples().iter().map(|s| s.image_points()[0].x).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);

        c.arm();
        c.reset();
        assert_eq!(c.count(), 0);
        assert!(!c.is_armed());
    }
}
