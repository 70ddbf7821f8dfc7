//! The fixed 68-point facial landmark layout
//!
//! Extraction always yields the same ordered sequence of 68 points; the
//! eye contours occupy fixed half-open sub-ranges of that sequence, each
//! ordered from the outer corner around the upper lid to the inner
//! corner and back along the lower lid. The openness metric depends on
//! this order; any permutation invalidates it.

use crate::geometry::Point;
use std::ops::Range;

/// Number of points in the full landmark layout
pub const LANDMARK_COUNT: usize = 68;

/// Right-eye contour indices within the 68-point layout
pub const RIGHT_EYE: Range<usize> = 36..42;

/// Left-eye contour indices within the 68-point layout
pub const LEFT_EYE: Range<usize> = 42..48;

/// Slice the right-eye contour out of a full landmark sequence
pub fn right_eye(landmarks: &[Point]) -> Option<&[Point]> {
    landmarks.get(RIGHT_EYE)
}

/// Slice the left-eye contour out of a full landmark sequence
pub fn left_eye(landmarks: &[Point]) -> Option<&[Point]> {
    landmarks.get(LEFT_EYE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_ranges_are_six_points_each() {
        assert_eq!(RIGHT_EYE.len(), 6);
        assert_eq!(LEFT_EYE.len(), 6);
    }

    #[test]
    fn test_eye_ranges_are_disjoint_and_in_layout() {
        assert_eq!(RIGHT_EYE.end, LEFT_EYE.start);
        assert!(LEFT_EYE.end <= LANDMARK_COUNT);
    }

    #[test]
    fn test_slicing_requires_full_layout() {
        let short = vec![Point::default(); 40];
        assert!(right_eye(&short).is_some());
        assert!(left_eye(&short).is_none());

        let full = vec![Point::default(); LANDMARK_COUNT];
        assert_eq!(left_eye(&full).map(<[Point]>::len), Some(6));
    }
}
