//! Frontal face locator backed by the SeetaFace funnel cascade in `rustface`.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use image::RgbImage;

use crate::detection::domain::face_locator::{FaceLocator, FaceLocatorConfig};
use crate::shared::constants::{DEFAULT_MIN_NEIGHBORS, FACE_MODEL_NAME, FACE_MODEL_URL};
use crate::shared::error::PrivacyError;
use crate::shared::model_resolver::{self, ModelSource, ProgressFn};
use crate::shared::rectangle::Rectangle;

const ENGINE: &str = "face detector";

/// Cascade score threshold at the default strictness.
const BASE_SCORE_THRESH: f64 = 2.0;

/// Sliding window step in pixels, both axes.
const WINDOW_STEP: u32 = 4;

/// SeetaFace face locator.
///
/// Holds the raw model bytes, checked once at load time; each call parses
/// them into a fresh detector, so the locator can be shared across threads.
pub struct RustfaceFaceLocator {
    model_data: Vec<u8>,
    config: FaceLocatorConfig,
}

impl RustfaceFaceLocator {
    /// Load the cascade model from a file.
    pub fn from_file(model_path: &Path, config: FaceLocatorConfig) -> Result<Self, PrivacyError> {
        config.validate()?;
        let model_data = fs::read(model_path).map_err(|e| PrivacyError::EngineUnavailable {
            engine: ENGINE,
            reason: format!("cannot open model {}: {e}", model_path.display()),
        })?;
        parse_model(&model_data)?;
        log::info!("Loaded face model from {}", model_path.display());
        Ok(Self { model_data, config })
    }

    /// Resolve the model (explicit path, cache, bundled copy, or download)
    /// and load it.
    pub fn from_model_source(
        source: &ModelSource,
        config: FaceLocatorConfig,
        progress: Option<ProgressFn>,
    ) -> Result<Self, PrivacyError> {
        let path = model_resolver::resolve(FACE_MODEL_NAME, FACE_MODEL_URL, source, progress)
            .map_err(|e| PrivacyError::EngineUnavailable {
                engine: ENGINE,
                reason: e.to_string(),
            })?;
        Self::from_file(&path, config)
    }

    pub fn config(&self) -> &FaceLocatorConfig {
        &self.config
    }
}

impl FaceLocator for RustfaceFaceLocator {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Rectangle>, PrivacyError> {
        let gray = image::imageops::grayscale(image);
        let (width, height) = gray.dimensions();

        let model = parse_model(&self.model_data)?;
        let mut detector = rustface::create_detector_with_model(model);
        detector.set_min_face_size(self.config.min_face_size);
        detector.set_score_thresh(score_threshold(self.config.min_neighbors));
        detector.set_pyramid_scale_factor(pyramid_factor(self.config.scale_factor));
        detector.set_slide_window_step(WINDOW_STEP, WINDOW_STEP);

        let faces = detector.detect(&rustface::ImageData::new(gray.as_raw(), width, height));
        let rects: Vec<Rectangle> = faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                Rectangle::new(bbox.x(), bbox.y(), bbox.width(), bbox.height())
            })
            .filter(|r| !r.is_empty())
            .collect();

        log::info!("Detected {} face(s)", rects.len());
        Ok(rects)
    }
}

fn parse_model(data: &[u8]) -> Result<rustface::Model, PrivacyError> {
    rustface::read_model(Cursor::new(data)).map_err(|e| PrivacyError::EngineUnavailable {
        engine: ENGINE,
        reason: format!("cannot read model: {e}"),
    })
}

/// The cascade shrinks the image by this factor between pyramid levels.
fn pyramid_factor(scale_factor: f64) -> f32 {
    (1.0 / scale_factor) as f32
}

/// Map neighbour-count strictness onto the cascade's score threshold.
fn score_threshold(min_neighbors: u32) -> f64 {
    BASE_SCORE_THRESH * min_neighbors as f64 / DEFAULT_MIN_NEIGHBORS as f64
}
