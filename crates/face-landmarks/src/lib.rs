//! Facial Geometry Extraction
//!
//! The monitor's boundary to face detection and landmark extraction:
//! - Face region detection over grayscale frames
//! - 68-point facial landmark extraction per region
//! - Fixed landmark layout with the eye-contour index ranges
//!
//! Extraction is pluggable through [`LandmarkProvider`]; the bundled
//! implementation runs ONNX models when configured and falls back to a
//! deterministic mock geometry otherwise.

pub mod geometry;
pub mod layout;
pub mod provider;

pub use geometry::Point;
pub use layout::{left_eye, right_eye, LANDMARK_COUNT, LEFT_EYE, RIGHT_EYE};
pub use provider::{FaceRegion, LandmarkProvider, OnnxLandmarkProvider, ProviderConfig};

use thiserror::Error;

/// Landmark extraction error types
#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),
}
