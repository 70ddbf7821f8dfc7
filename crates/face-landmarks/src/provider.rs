//! Face detection and landmark extraction providers

use crate::geometry::Point;
use crate::layout::{LANDMARK_COUNT, LEFT_EYE, RIGHT_EYE};
use crate::LandmarkError;
use camera_capture::frame::GrayFrame;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Face bounding box in frame coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Face detection confidence threshold
    pub face_confidence: f32,

    /// Model paths; mock geometry is used for whichever is absent
    pub face_model_path: Option<String>,
    pub landmark_model_path: Option<String>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            face_confidence: 0.7,
            face_model_path: None,
            landmark_model_path: None,
        }
    }
}

/// Boundary to the external facial-geometry capability.
///
/// `detect` returns zero or more face regions for a grayscale frame.
/// `landmarks` returns the full ordered 68-point layout for one region,
/// or `Ok(None)` when extraction is not possible on this frame (the
/// caller treats that as "no reliable measurement", not a failure).
pub trait LandmarkProvider {
    /// Detect face regions in a grayscale frame
    fn detect(&self, frame: &GrayFrame) -> Result<Vec<FaceRegion>, LandmarkError>;

    /// Extract the ordered 68-point landmark sequence for a region
    fn landmarks(
        &self,
        frame: &GrayFrame,
        region: &FaceRegion,
    ) -> Result<Option<Vec<Point>>, LandmarkError>;
}

/// ONNX-backed provider with a deterministic mock fallback.
///
/// Expected model contracts:
/// - face model: input `1x3x128x128` normalized to [-1, 1], output at
///   least 5 floats `[cx, cy, w, h, score]` normalized to frame size
/// - landmark model: input `1x3x112x112` normalized to [0, 1], output
///   136 floats, x/y pairs normalized to the face crop
pub struct OnnxLandmarkProvider {
    confidence_threshold: f32,
    face_session: Option<Session>,
    landmark_session: Option<Session>,
}

impl OnnxLandmarkProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, LandmarkError> {
        let face_session = match &config.face_model_path {
            Some(path) => Some(load_session(path, "face detection")?),
            None => {
                warn!("No face model path configured. Using mock face detection.");
                None
            }
        };

        let landmark_session = match &config.landmark_model_path {
            Some(path) => Some(load_session(path, "landmark")?),
            None => {
                warn!("No landmark model path configured. Using mock landmark geometry.");
                None
            }
        };

        Ok(Self {
            confidence_threshold: config.face_confidence,
            face_session,
            landmark_session,
        })
    }
}

impl LandmarkProvider for OnnxLandmarkProvider {
    fn detect(&self, frame: &GrayFrame) -> Result<Vec<FaceRegion>, LandmarkError> {
        let Some(session) = &self.face_session else {
            return Ok(vec![mock_region(frame)]);
        };

        let input = preprocess(frame, 128, |v| v / 127.5 - 1.0)?;
        let raw = run_to_vec(session, input)?;
        if raw.len() < 5 {
            return Err(LandmarkError::MalformedOutput(format!(
                "face model produced {} values, expected at least 5",
                raw.len()
            )));
        }

        let score = raw[4];
        if score < self.confidence_threshold {
            debug!("Face candidate below threshold: {:.2}", score);
            return Ok(Vec::new());
        }

        let fw = frame.width as f32;
        let fh = frame.height as f32;
        let w = raw[2] * fw;
        let h = raw[3] * fh;
        Ok(vec![FaceRegion {
            x: raw[0] * fw - w / 2.0,
            y: raw[1] * fh - h / 2.0,
            width: w,
            height: h,
            confidence: score,
        }])
    }

    fn landmarks(
        &self,
        frame: &GrayFrame,
        region: &FaceRegion,
    ) -> Result<Option<Vec<Point>>, LandmarkError> {
        let Some(session) = &self.landmark_session else {
            return Ok(Some(mock_landmarks(region)));
        };

        // Clamp the region to the frame; a region that degenerates to an
        // empty crop means extraction is not possible on this frame.
        let x0 = region.x.max(0.0) as u32;
        let y0 = region.y.max(0.0) as u32;
        let x1 = ((region.x + region.width).min(frame.width as f32)) as u32;
        let y1 = ((region.y + region.height).min(frame.height as f32)) as u32;
        if x1 <= x0 || y1 <= y0 {
            debug!("Face region outside frame; skipping extraction");
            return Ok(None);
        }
        let Some(crop) = frame.crop(x0, y0, x1 - x0, y1 - y0) else {
            return Ok(None);
        };

        let input = preprocess(&crop, 112, |v| v / 255.0)?;
        let raw = run_to_vec(session, input)?;
        if raw.len() < LANDMARK_COUNT * 2 {
            return Err(LandmarkError::MalformedOutput(format!(
                "landmark model produced {} values, expected {}",
                raw.len(),
                LANDMARK_COUNT * 2
            )));
        }

        let cw = (x1 - x0) as f32;
        let ch = (y1 - y0) as f32;
        let points = (0..LANDMARK_COUNT)
            .map(|i| {
                Point::new(
                    x0 as f32 + raw[2 * i] * cw,
                    y0 as f32 + raw[2 * i + 1] * ch,
                )
            })
            .collect();
        Ok(Some(points))
    }
}

fn load_session(path: &str, purpose: &str) -> Result<Session, LandmarkError> {
    info!("Loading {} model from {}", purpose, path);
    Session::builder()
        .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
        .and_then(|b| b.commit_from_file(path))
        .map_err(|e| {
            error!("Failed to load {} model: {}", purpose, e);
            LandmarkError::ModelLoad(e.to_string())
        })
}

/// Resize a grayscale frame to `side`x`side` and replicate the luma
/// channel into a 1x3xNxN tensor with the given normalization
fn preprocess(
    frame: &GrayFrame,
    side: u32,
    normalize: impl Fn(f32) -> f32,
) -> Result<Array4<f32>, LandmarkError> {
    let img = image::ImageBuffer::<image::Luma<u8>, _>::from_raw(
        frame.width,
        frame.height,
        frame.data.clone(),
    )
    .ok_or_else(|| LandmarkError::ImageProcessing("Failed to create image buffer".into()))?;

    let resized = image::imageops::resize(&img, side, side, image::imageops::FilterType::Triangle);

    let mut input = Array4::<f32>::zeros((1, 3, side as usize, side as usize));
    for (x, y, pixel) in resized.enumerate_pixels() {
        let v = normalize(pixel[0] as f32);
        input[[0, 0, y as usize, x as usize]] = v;
        input[[0, 1, y as usize, x as usize]] = v;
        input[[0, 2, y as usize, x as usize]] = v;
    }
    Ok(input)
}

/// Run a session over a single tensor input and flatten the first output
fn run_to_vec(session: &Session, input: Array4<f32>) -> Result<Vec<f32>, LandmarkError> {
    let output_name = session
        .outputs
        .first()
        .map(|o| o.name.clone())
        .ok_or_else(|| LandmarkError::MalformedOutput("model declares no outputs".into()))?;
    let outputs = session
        .run(ort::inputs![input].map_err(|e| LandmarkError::Inference(e.to_string()))?)
        .map_err(|e| LandmarkError::Inference(e.to_string()))?;

    let tensor = outputs[output_name.as_str()]
        .try_extract_tensor::<f32>()
        .map_err(|e| LandmarkError::MalformedOutput(e.to_string()))?;
    Ok(tensor.iter().copied().collect())
}

/// Centered face region covering the typical seated-operator framing
fn mock_region(frame: &GrayFrame) -> FaceRegion {
    FaceRegion {
        x: frame.width as f32 * 0.3,
        y: frame.height as f32 * 0.2,
        width: frame.width as f32 * 0.4,
        height: frame.height as f32 * 0.5,
        confidence: 0.95,
    }
}

/// Deterministic open-eye landmark layout for a region.
///
/// Only the eye contours carry real geometry (open hexagons with a
/// vertical/horizontal span ratio of 0.3); the remaining points sit at
/// the region center to complete the 68-point layout.
fn mock_landmarks(region: &FaceRegion) -> Vec<Point> {
    let center = Point::new(
        region.x + region.width / 2.0,
        region.y + region.height / 2.0,
    );
    let mut points = vec![center; LANDMARK_COUNT];

    let eye_half_width = region.width * 0.09;
    let right_center = Point::new(
        region.x + region.width * 0.30,
        region.y + region.height * 0.38,
    );
    let left_center = Point::new(
        region.x + region.width * 0.70,
        region.y + region.height * 0.38,
    );

    points[RIGHT_EYE].copy_from_slice(&open_eye_hexagon(right_center, eye_half_width));
    points[LEFT_EYE].copy_from_slice(&open_eye_hexagon(left_center, eye_half_width));
    points
}

/// Six contour points in anatomical order: outer corner, two upper-lid
/// points, inner corner, two lower-lid points
fn open_eye_hexagon(center: Point, half_width: f32) -> [Point; 6] {
    let v = half_width * 0.3;
    [
        Point::new(center.x - half_width, center.y),
        Point::new(center.x - half_width / 3.0, center.y - v),
        Point::new(center.x + half_width / 3.0, center.y - v),
        Point::new(center.x + half_width, center.y),
        Point::new(center.x + half_width / 3.0, center.y + v),
        Point::new(center.x - half_width / 3.0, center.y + v),
    ]
}
