use image::RgbImage;

use crate::shared::constants::{DEFAULT_MIN_FACE_SIZE, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR};
use crate::shared::error::PrivacyError;
use crate::shared::rectangle::Rectangle;

/// Domain interface for face localization.
///
/// An unavailable backend is an `Err`, never an empty list: an empty
/// `Ok` means the image genuinely contains no detectable face.
pub trait FaceLocator: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Rectangle>, PrivacyError>;
}

/// Tuning knobs shared by cascade-style face detectors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceLocatorConfig {
    /// Image pyramid step between scales; must be > 1.0.
    pub scale_factor: f64,
    /// Strictness: higher values reduce false positives and miss more faces.
    pub min_neighbors: u32,
    /// Smallest face edge, in pixels, worth reporting.
    pub min_face_size: u32,
}

impl Default for FaceLocatorConfig {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_face_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}

impl FaceLocatorConfig {
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_min_neighbors(mut self, min_neighbors: u32) -> Self {
        self.min_neighbors = min_neighbors;
        self
    }

    pub fn validate(&self) -> Result<(), PrivacyError> {
        if !(self.scale_factor > 1.0 && self.scale_factor.is_finite()) {
            return Err(PrivacyError::Configuration(format!(
                "scale factor must be greater than 1.0, got {}",
                self.scale_factor
            )));
        }
        if self.min_neighbors == 0 {
            return Err(PrivacyError::Configuration(
                "min neighbors must be at least 1".into(),
            ));
        }
        if self.min_face_size == 0 {
            return Err(PrivacyError::Configuration(
                "min face size must be at least 1 pixel".into(),
            ));
        }
        Ok(())
    }
}
