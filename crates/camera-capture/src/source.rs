//! Frame acquisition boundary

use crate::frame::VideoFrame;
use crate::{CameraConfig, CameraError};
use tracing::info;

/// Per-frame pull interface over whatever produces video frames.
///
/// Real camera I/O (V4L2, UVC, platform SDKs) lives behind this trait;
/// the monitor loop only ever sees decoded frames. `Ok(None)` means the
/// source is exhausted and the loop should stop.
pub trait FrameSource {
    /// Fetch the next frame, blocking up to the source's own deadline
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError>;
}

/// Deterministic frame generator for tests and camera-less runs
pub struct SyntheticSource {
    width: u32,
    height: u32,
    /// Frames still to produce, or None for an unbounded stream
    remaining: Option<u64>,
    sequence: u32,
    frame_interval_ns: u64,
}

impl SyntheticSource {
    /// Create a source producing flat mid-gray frames at the configured size
    pub fn new(config: &CameraConfig) -> Self {
        info!(
            "Synthetic frame source: {}x{} @ {} fps",
            config.width, config.height, config.fps
        );
        Self {
            width: config.width,
            height: config.height,
            remaining: None,
            sequence: 0,
            frame_interval_ns: 1_000_000_000 / config.fps.max(1) as u64,
        }
    }

    /// Limit the stream to a fixed number of frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<VideoFrame>, CameraError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }

        let data = vec![128u8; (self.width * self.height * 3) as usize];
        let frame = VideoFrame::new(
            data,
            self.width,
            self.height,
            self.sequence as u64 * self.frame_interval_ns,
            self.sequence,
        );
        self.sequence = self.sequence.wrapping_add(1);
        Ok(Some(frame))
    }
}
