//! Drowsiness engine configuration

use crate::DrowsinessError;
use serde::{Deserialize, Serialize};

/// Drowsiness engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrowsinessConfig {
    /// EAR below this value counts as a low-openness frame
    pub ear_threshold: f32,

    /// Consecutive low frames required before the alarm latches
    pub consecutive_frames: u32,
}

impl Default for DrowsinessConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            consecutive_frames: 15,
        }
    }
}

impl DrowsinessConfig {
    /// Create strict config (alarms sooner)
    pub fn strict() -> Self {
        Self {
            ear_threshold: 0.27,
            consecutive_frames: 10,
        }
    }

    /// Create lenient config (tolerates longer closures)
    pub fn lenient() -> Self {
        Self {
            ear_threshold: 0.22,
            consecutive_frames: 25,
        }
    }

    /// Validate the configuration before any frame is processed.
    ///
    /// Out-of-range values are a startup error, never a per-frame one.
    pub fn validate(&self) -> Result<(), DrowsinessError> {
        if !self.ear_threshold.is_finite() || self.ear_threshold <= 0.0 {
            return Err(DrowsinessError::Config(format!(
                "ear_threshold must be a positive finite value, got {}",
                self.ear_threshold
            )));
        }
        if self.consecutive_frames < 1 {
            return Err(DrowsinessError::Config(
                "consecutive_frames must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
