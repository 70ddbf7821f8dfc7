//! Eye aspect ratio (EAR) metric
//!
//! Maps six ordered eye-contour points to a scalar openness measure.
//! Open eyes sit around 0.3; the value drops toward 0 as the lids close.

use face_landmarks::Point;

/// Points in an eye contour
pub const CONTOUR_POINTS: usize = 6;

/// An ordered six-point eye contour.
///
/// Order is anatomical and load-bearing: outer corner, two upper-lid
/// points, inner corner, two lower-lid points. Permuting the points
/// changes what the ratio measures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeContour {
    points: [Point; CONTOUR_POINTS],
}

impl EyeContour {
    /// Build a contour from exactly six ordered points
    pub fn from_slice(points: &[Point]) -> Option<Self> {
        let points: [Point; CONTOUR_POINTS] = points.try_into().ok()?;
        Some(Self { points })
    }

    /// Compute the eye aspect ratio:
    ///
    /// `EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)` with 1-indexed points.
    ///
    /// Returns `None` when the horizontal span collapses (degenerate
    /// extraction) or the ratio is not finite; such a frame carries no
    /// reliable measurement.
    pub fn aspect_ratio(&self) -> Option<f32> {
        let [p1, p2, p3, p4, p5, p6] = &self.points;

        let horizontal = p1.distance(p4);
        if horizontal <= f32::EPSILON {
            return None;
        }

        let ear = (p2.distance(p6) + p3.distance(p5)) / (2.0 * horizontal);
        ear.is_finite().then_some(ear)
    }
}
