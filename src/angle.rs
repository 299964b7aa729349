//! Joint angle calculation using the dot product.
//!
//! The angle at vertex `b` is measured between the vectors `b -> a` and
//! `b -> c`. Degenerate geometry yields `None` instead of a number.

use crate::constants::{MAX_JOINT_ANGLE, MIN_JOINT_ANGLE, MIN_VECTOR_NORM};
use crate::landmarks::Frame;
use serde::{Deserialize, Serialize};

/// Calculate the angle at `b` in degrees, in `[0, 180]`
///
/// Returns `None` when either vector is shorter than [`MIN_VECTOR_NORM`] or
/// any coordinate is not finite.
#[must_use]
pub fn joint_angle(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<f64> {
    let v1 = (a.0 - b.0, a.1 - b.1);
    let v2 = (c.0 - b.0, c.1 - b.1);

    let mag1 = v1.0.hypot(v1.1);
    let mag2 = v2.0.hypot(v2.1);

    // NaN fails both comparisons, so non-finite input is rejected here too
    if !(mag1 >= MIN_VECTOR_NORM && mag2 >= MIN_VECTOR_NORM) || !mag1.is_finite() || !mag2.is_finite() {
        return None;
    }

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);

    Some(cos_angle.acos().to_degrees().clamp(MIN_JOINT_ANGLE, MAX_JOINT_ANGLE))
}

/// Landmark triplet `(a, vertex, c)` whose angle is measured at the vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointAngleSpec {
    pub a: usize,
    pub vertex: usize,
    pub c: usize,
}

impl JointAngleSpec {
    #[must_use]
    pub const fn new(a: usize, vertex: usize, c: usize) -> Self {
        Self { a, vertex, c }
    }

    /// Landmark indices this spec reads
    #[must_use]
    pub const fn indices(&self) -> [usize; 3] {
        [self.a, self.vertex, self.c]
    }

    /// Measure this joint in a frame
    ///
    /// `None` if a landmark is missing, below `confidence_floor`, or the
    /// geometry is degenerate.
    #[must_use]
    pub fn measure(&self, frame: &Frame, confidence_floor: f64) -> Option<f64> {
        let mut points = [(0.0, 0.0); 3];
        for (slot, index) in points.iter_mut().zip(self.indices()) {
            let landmark = frame.get(index)?;
            if !landmark.is_finite() || landmark.score < confidence_floor {
                return None;
            }
            *slot = landmark.point();
        }
        joint_angle(points[0], points[1], points[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn test_straight_joint() {
        let angle = joint_angle((0.0, 0.0), (0.5, 0.0), (1.0, 0.0)).unwrap();
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle() {
        let angle = joint_angle((0.0, 0.0), (0.5, 0.0), (0.5, 0.5)).unwrap();
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_folded_joint() {
        let angle = joint_angle((1.0, 0.0), (0.0, 0.0), (2.0, 0.0)).unwrap();
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_vectors() {
        assert!(joint_angle((0.5, 0.5), (0.5, 0.5), (1.0, 0.0)).is_none());
        assert!(joint_angle((0.0, 0.0), (0.5, 0.5), (0.5, 0.5)).is_none());
        assert!(joint_angle((f64::NAN, 0.0), (0.5, 0.5), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_sign_flip_invariance() {
        // Vertex-minus-point gives the same magnitude as point-minus-vertex
        let (a, b, c) = ((0.2, 0.9), (0.4, 0.5), (0.9, 0.6));
        let forward = joint_angle(a, b, c).unwrap();
        let mirrored = joint_angle((2.0 * b.0 - a.0, 2.0 * b.1 - a.1), b, (2.0 * b.0 - c.0, 2.0 * b.1 - c.1)).unwrap();
        assert!((forward - mirrored).abs() < 1e-9);
    }

    #[test]
    fn test_measure_respects_confidence() {
        let frame = Frame::new(vec![
            Landmark::new(0.0, 0.0, 0.9),
            Landmark::new(0.5, 0.0, 0.9),
            Landmark::new(0.5, 0.5, 0.3),
        ]);
        let spec = JointAngleSpec::new(0, 1, 2);
        assert!(spec.measure(&frame, 0.5).is_none());
        assert!((spec.measure(&frame, 0.2).unwrap() - 90.0).abs() < 1e-9);
        assert!(JointAngleSpec::new(0, 1, 7).measure(&frame, 0.0).is_none());
    }
}
