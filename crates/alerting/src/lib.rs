//! Alerting System
//!
//! Rate-limits alarm emission independent of frame rate and keeps audio
//! playback off the frame loop:
//! - `AlertDispatcher` enforces a minimum inter-alert cooldown
//! - `AlertChannel` queues emission onto a background task
//! - `AlertSink` is the boundary to the actual audio capability, with a
//!   terminal-bell fallback that never fails the pipeline

mod dispatcher;
mod sound;

pub use dispatcher::{AlertDispatcher, DispatchConfig};
pub use sound::{AlertChannel, AlertHandle, AlertSink, TerminalBell};

use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Configuration error: {0}")]
    Config(String),
}
