//! Camera Capture Library for the Vigilance Monitor
//!
//! Provides the frame types consumed by the detection pipeline and the
//! `FrameSource` boundary behind which real camera I/O lives:
//! - Operator-facing webcam (640x480 @ 15fps) for drowsiness monitoring
//! - Synthetic source for tests and camera-less runs

pub mod frame;
pub mod source;

pub use frame::{GrayFrame, VideoFrame};
pub use source::{FrameSource, SyntheticSource};

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Failed to open camera: {0}")]
    Open(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("Streaming error: {0}")]
    Stream(String),

    #[error("Capture timeout")]
    Timeout,

    #[error("Camera not initialized")]
    NotInitialized,
}

/// Camera configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Device path (e.g., "/dev/video0")
    pub device: String,
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
    /// Mirror frames horizontally (selfie view)
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self::webcam()
    }
}

impl CameraConfig {
    /// Create operator webcam config (drowsiness monitoring)
    pub fn webcam() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            fps: 15,
            mirror: true,
        }
    }
}
