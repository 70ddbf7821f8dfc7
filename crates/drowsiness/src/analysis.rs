//! Per-frame analysis results

use crate::session::VigilanceState;
use face_landmarks::FaceRegion;
use serde::{Deserialize, Serialize};

/// Complete per-frame drowsiness analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrowsinessAnalysis {
    /// Whether a face was detected
    pub face_detected: bool,

    /// Tracked face region (if detected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_region: Option<FaceRegion>,

    /// Left-eye aspect ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_ear: Option<f32>,

    /// Right-eye aspect ratio
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_ear: Option<f32>,

    /// Averaged EAR, absent when the frame carried no reliable measurement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ear: Option<f32>,

    /// Vigilance state after this frame
    pub state: VigilanceState,

    /// Whether the alarm is latched
    pub alarm_active: bool,

    /// True only on the frame where the alarm latched
    pub alarm_raised: bool,
}

impl DrowsinessAnalysis {
    /// Whether this frame produced a usable openness measurement
    pub fn measured(&self) -> bool {
        self.ear.is_some()
    }
}
