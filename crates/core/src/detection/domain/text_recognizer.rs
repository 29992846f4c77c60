use std::path::Path;

use serde::Serialize;

use crate::shared::error::PrivacyError;
use crate::shared::rectangle::Rectangle;

/// Position of a word in the engine's page layout.
///
/// Ordering follows reading order: block, then paragraph, then line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineId {
    pub block: u32,
    pub paragraph: u32,
    pub line: u32,
}

impl LineId {
    pub fn new(block: u32, paragraph: u32, line: u32) -> Self {
        Self {
            block,
            paragraph,
            line,
        }
    }
}

/// One word as reported by an OCR engine.
#[derive(Clone, Debug, PartialEq)]
pub struct RecognizedWord {
    /// Bounding polygon in image pixels; may be skewed.
    pub polygon: Vec<(f32, f32)>,
    pub text: String,
    /// Engine confidence in `[0, 1]`, when the engine reports one.
    pub confidence: Option<f32>,
    pub line: LineId,
}

impl RecognizedWord {
    pub fn bounds(&self) -> Option<Rectangle> {
        Rectangle::bounding(&self.polygon)
    }
}

/// A grouped OCR result, resolved once at the engine boundary.
///
/// `confidence` is `None` when the engine (or the grouping mode) does not
/// report one; downstream code never has to guess the result's shape.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OcrDetection {
    pub polygon: Vec<(f32, f32)>,
    pub text: String,
    pub confidence: Option<f32>,
}

impl OcrDetection {
    pub fn bounds(&self) -> Option<Rectangle> {
        Rectangle::bounding(&self.polygon)
    }
}

/// An OCR engine. Engines are not assumed to be safe for concurrent use,
/// hence `&mut self`.
pub trait TextRecognizer: Send {
    fn recognize(&mut self, image_path: &Path) -> Result<Vec<RecognizedWord>, PrivacyError>;
}

/// Shared, serialized access to a single OCR engine.
pub trait RecognitionService: Send + Sync {
    fn recognize(&self, image_path: &Path) -> Result<Vec<RecognizedWord>, PrivacyError>;
}
