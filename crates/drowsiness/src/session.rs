//! Vigilance session state machine
//!
//! Two states: `Monitoring` (alarm clear) and `Alerting` (alarm latched).
//! The session consumes one averaged EAR observation per frame and moves
//! between them on a consecutive-frame debounce with instant recovery.

use crate::config::DrowsinessConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Vigilance state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VigilanceState {
    /// Eyes open or closure not yet sustained
    #[default]
    Monitoring,
    /// Sustained closure detected, alarm latched
    Alerting,
}

/// Outcome of a single frame observation
#[derive(Debug, Clone, Copy)]
pub struct FrameAssessment {
    /// State after this observation
    pub state: VigilanceState,
    /// Whether the alarm is latched
    pub alarm_active: bool,
    /// True only on the frame where the alarm latched (rising edge)
    pub alarm_raised: bool,
    /// Current consecutive low-openness frame count
    pub low_frames: u32,
}

/// Per-session drowsiness state, owned by the monitoring session.
///
/// One instance tracks one face. Created in `Monitoring` with a zero
/// counter; lives as long as the session and needs no cleanup.
#[derive(Debug, Clone)]
pub struct VigilanceSession {
    config: DrowsinessConfig,
    consecutive_low_frames: u32,
    state: VigilanceState,
}

impl VigilanceSession {
    /// Create a session in the initial `Monitoring` state
    pub fn new(config: DrowsinessConfig) -> Self {
        Self {
            config,
            consecutive_low_frames: 0,
            state: VigilanceState::Monitoring,
        }
    }

    /// Consume one frame's averaged EAR observation.
    ///
    /// `None` means no reliable measurement this frame (no face, or
    /// degenerate geometry); the session freezes rather than resetting,
    /// so a face lost mid-alarm stays latched until a frame with
    /// recovered openness arrives.
    pub fn observe(&mut self, ear: Option<f32>) -> FrameAssessment {
        let mut alarm_raised = false;

        match ear {
            Some(value) if value < self.config.ear_threshold => {
                self.consecutive_low_frames = self.consecutive_low_frames.saturating_add(1);
                debug!(
                    "Low EAR {:.3} ({}/{})",
                    value, self.consecutive_low_frames, self.config.consecutive_frames
                );

                if self.consecutive_low_frames >= self.config.consecutive_frames
                    && self.state == VigilanceState::Monitoring
                {
                    warn!(
                        "Sustained eye closure: {} consecutive low frames",
                        self.consecutive_low_frames
                    );
                    self.state = VigilanceState::Alerting;
                    alarm_raised = true;
                }
            }
            Some(_) => {
                // Counter reset and alarm clear happen together; recovery
                // is instant, not gradual.
                if self.state == VigilanceState::Alerting {
                    info!("Eye openness recovered, alarm cleared");
                }
                self.consecutive_low_frames = 0;
                self.state = VigilanceState::Monitoring;
            }
            None => {}
        }

        FrameAssessment {
            state: self.state,
            alarm_active: self.state == VigilanceState::Alerting,
            alarm_raised,
            low_frames: self.consecutive_low_frames,
        }
    }

    /// Current state
    pub fn state(&self) -> VigilanceState {
        self.state
    }

    /// Current consecutive low-openness frame count
    pub fn low_frames(&self) -> u32 {
        self.consecutive_low_frames
    }

    /// Reset to the initial state (on operator change)
    pub fn reset(&mut self) {
        self.consecutive_low_frames = 0;
        self.state = VigilanceState::Monitoring;
    }
}
