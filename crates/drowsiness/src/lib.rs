//! Drowsiness Decision Engine
//!
//! Converts per-frame facial geometry into a debounced alarm state:
//! - Eye aspect ratio (EAR) metric over six-point eye contours
//! - Consecutive-frame debounce with instant recovery
//! - Freeze-on-face-loss semantics (alarm stays latched until the eyes
//!   are seen open again)
//!
//! The engine holds the only mutable state in the pipeline; everything
//! upstream (capture, landmark extraction) is stateless per frame.

pub mod analysis;
pub mod config;
pub mod ear;
pub mod session;

pub use analysis::DrowsinessAnalysis;
pub use config::DrowsinessConfig;
pub use ear::EyeContour;
pub use session::{FrameAssessment, VigilanceSession, VigilanceState};

use camera_capture::frame::GrayFrame;
use face_landmarks::{left_eye, right_eye, FaceRegion, LandmarkProvider};
use thiserror::Error;
use tracing::{debug, warn};

/// Drowsiness engine error types
#[derive(Error, Debug)]
pub enum DrowsinessError {
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Per-frame drowsiness monitor.
///
/// Owns the landmark provider and the vigilance session. When several
/// faces are detected, only the first region is tracked; multi-person
/// monitoring is out of scope and a single shared session across faces
/// would let one person's open eyes mask another's closure.
pub struct DrowsinessMonitor<P: LandmarkProvider> {
    provider: P,
    session: VigilanceSession,
}

impl<P: LandmarkProvider> DrowsinessMonitor<P> {
    /// Create a monitor, validating configuration up front
    pub fn new(config: DrowsinessConfig, provider: P) -> Result<Self, DrowsinessError> {
        config.validate()?;
        Ok(Self {
            provider,
            session: VigilanceSession::new(config),
        })
    }

    /// Analyze a single grayscale frame.
    ///
    /// Measurement failures (no face, failed extraction, degenerate
    /// contours) never escape: they fold into a frame with no reliable
    /// EAR, which freezes the session per the face-loss policy.
    pub fn analyze(&mut self, frame: &GrayFrame) -> DrowsinessAnalysis {
        let regions = match self.provider.detect(frame) {
            Ok(regions) => regions,
            Err(e) => {
                warn!("Face detection failed, skipping frame: {}", e);
                return self.no_measurement(None);
            }
        };

        let Some(region) = regions.into_iter().next() else {
            debug!("No face detected");
            return self.no_measurement(None);
        };

        let landmarks = match self.provider.landmarks(frame, &region) {
            Ok(Some(landmarks)) => landmarks,
            Ok(None) => {
                debug!("Landmark extraction not possible this frame");
                return self.no_measurement(Some(region));
            }
            Err(e) => {
                warn!("Landmark extraction failed, skipping frame: {}", e);
                return self.no_measurement(Some(region));
            }
        };

        let left_ear = left_eye(&landmarks)
            .and_then(EyeContour::from_slice)
            .and_then(|c| c.aspect_ratio());
        let right_ear = right_eye(&landmarks)
            .and_then(EyeContour::from_slice)
            .and_then(|c| c.aspect_ratio());

        // Both eyes must measure; a single degenerate contour makes the
        // average meaningless.
        let ear = match (left_ear, right_ear) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            _ => None,
        };

        let assessment = self.session.observe(ear);
        DrowsinessAnalysis {
            face_detected: true,
            face_region: Some(region),
            left_ear,
            right_ear,
            ear,
            state: assessment.state,
            alarm_active: assessment.alarm_active,
            alarm_raised: assessment.alarm_raised,
        }
    }

    /// Access the vigilance session (state inspection)
    pub fn session(&self) -> &VigilanceSession {
        &self.session
    }

    /// Reset session state (on operator change)
    pub fn reset_session(&mut self) {
        self.session.reset();
    }

    fn no_measurement(&mut self, region: Option<FaceRegion>) -> DrowsinessAnalysis {
        let assessment = self.session.observe(None);
        DrowsinessAnalysis {
            face_detected: region.is_some(),
            face_region: region,
            left_ear: None,
            right_ear: None,
            ear: None,
            state: assessment.state,
            alarm_active: assessment.alarm_active,
            alarm_raised: assessment.alarm_raised,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture::frame::VideoFrame;
    use face_landmarks::{LandmarkError, Point, LANDMARK_COUNT, LEFT_EYE, RIGHT_EYE};

    fn contour_with_ear(center_x: f32, center_y: f32, ear: f32) -> [Point; 6] {
        // Horizontal span 20, vertical pairs 20 * ear
        let v = 10.0 * ear;
        [
            Point::new(center_x - 10.0, center_y),
            Point::new(center_x - 3.0, center_y - v),
            Point::new(center_x + 3.0, center_y - v),
            Point::new(center_x + 10.0, center_y),
            Point::new(center_x + 3.0, center_y + v),
            Point::new(center_x - 3.0, center_y + v),
        ]
    }

    /// Provider returning fixed landmark geometry for every frame
    struct FixedProvider {
        faces: bool,
        ear: f32,
    }

    impl LandmarkProvider for FixedProvider {
        fn detect(&self, _frame: &GrayFrame) -> Result<Vec<FaceRegion>, LandmarkError> {
            if self.faces {
                Ok(vec![FaceRegion {
                    x: 100.0,
                    y: 100.0,
                    width: 200.0,
                    height: 200.0,
                    confidence: 0.9,
                }])
            } else {
                Ok(Vec::new())
            }
        }

        fn landmarks(
            &self,
            _frame: &GrayFrame,
            _region: &FaceRegion,
        ) -> Result<Option<Vec<Point>>, LandmarkError> {
            let mut points = vec![Point::new(200.0, 250.0); LANDMARK_COUNT];
            points[RIGHT_EYE].copy_from_slice(&contour_with_ear(160.0, 170.0, self.ear));
            points[LEFT_EYE].copy_from_slice(&contour_with_ear(240.0, 170.0, self.ear));
            Ok(Some(points))
        }
    }

    fn frame() -> GrayFrame {
        VideoFrame::new(vec![128u8; 64 * 48 * 3], 64, 48, 0, 0).to_grayscale()
    }

    fn monitor(provider: FixedProvider) -> DrowsinessMonitor<FixedProvider> {
        DrowsinessMonitor::new(DrowsinessConfig::default(), provider).unwrap()
    }

    #[test]
    fn test_open_eyes_keep_monitoring() {
        let mut m = monitor(FixedProvider {
            faces: true,
            ear: 0.30,
        });
        let frame = frame();
        for _ in 0..30 {
            let a = m.analyze(&frame);
            assert!(a.face_detected);
            assert!(!a.alarm_active);
            assert!((a.ear.unwrap() - 0.30).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sustained_closure_raises_alarm() {
        let mut m = monitor(FixedProvider {
            faces: true,
            ear: 0.10,
        });
        let frame = frame();
        let mut raised_at = None;
        for i in 1..=20 {
            let a = m.analyze(&frame);
            if a.alarm_raised {
                raised_at = Some(i);
            }
        }
        assert_eq!(raised_at, Some(15));
        assert_eq!(m.session().state(), VigilanceState::Alerting);
    }

    #[test]
    fn test_no_face_frames_carry_no_measurement() {
        let mut m = monitor(FixedProvider {
            faces: false,
            ear: 0.30,
        });
        let a = m.analyze(&frame());
        assert!(!a.face_detected);
        assert!(!a.measured());
        assert_eq!(m.session().low_frames(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = DrowsinessConfig {
            ear_threshold: -1.0,
            ..Default::default()
        };
        let result = DrowsinessMonitor::new(
            config,
            FixedProvider {
                faces: true,
                ear: 0.3,
            },
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_degenerate_contour_freezes_session() {
        /// Provider whose eye contours are collapsed to a single point
        struct DegenerateProvider;

        impl LandmarkProvider for DegenerateProvider {
            fn detect(&self, _frame: &GrayFrame) -> Result<Vec<FaceRegion>, LandmarkError> {
                Ok(vec![FaceRegion {
                    x: 0.0,
                    y: 0.0,
                    width: 10.0,
                    height: 10.0,
                    confidence: 0.9,
                }])
            }

            fn landmarks(
                &self,
                _frame: &GrayFrame,
                _region: &FaceRegion,
            ) -> Result<Option<Vec<Point>>, LandmarkError> {
                Ok(Some(vec![Point::new(5.0, 5.0); LANDMARK_COUNT]))
            }
        }

        let mut m =
            DrowsinessMonitor::new(DrowsinessConfig::default(), DegenerateProvider).unwrap();
        let a = m.analyze(&frame());
        assert!(a.face_detected);
        assert!(!a.measured());
        assert!(!a.alarm_active);
    }
}
