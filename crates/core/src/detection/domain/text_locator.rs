use std::path::Path;
use std::sync::Arc;

use crate::detection::domain::sensitive_text;
use crate::detection::domain::text_grouper::{group_words, TextGrouping};
use crate::detection::domain::text_recognizer::{OcrDetection, RecognitionService};
use crate::shared::detected_region::DetectedRegion;
use crate::shared::error::PrivacyError;

/// Locates text regions in an image through an injected OCR service.
pub struct TextLocator {
    recognizer: Arc<dyn RecognitionService>,
}

impl TextLocator {
    pub fn new(recognizer: Arc<dyn RecognitionService>) -> Self {
        Self { recognizer }
    }

    /// Grouped OCR results, before any sensitivity filtering.
    pub fn read(
        &self,
        image_path: &Path,
        grouping: TextGrouping,
    ) -> Result<Vec<OcrDetection>, PrivacyError> {
        grouping.validate()?;
        let words = self.recognizer.recognize(image_path)?;
        Ok(group_words(&words, &grouping))
    }

    /// Returns one region per grouped text result.
    ///
    /// With `only_sensitive`, results whose text does not match the
    /// sensitive-text classifier are dropped before a rectangle is computed.
    pub fn detect(
        &self,
        image_path: &Path,
        grouping: TextGrouping,
        only_sensitive: bool,
    ) -> Result<Vec<DetectedRegion>, PrivacyError> {
        let detections = self.read(image_path, grouping)?;

        let mut regions = Vec::with_capacity(detections.len());
        for detection in detections {
            if only_sensitive && !sensitive_text::is_sensitive(&detection.text) {
                continue;
            }
            let Some(rect) = detection.bounds() else {
                continue;
            };
            log::info!(
                "  Detected: '{}' at ({}, {}) size {}x{}",
                detection.text,
                rect.x(),
                rect.y(),
                rect.width(),
                rect.height()
            );
            regions.push(DetectedRegion::text(rect, detection.text, detection.confidence));
        }

        log::info!("Detected {} text region(s)", regions.len());
        Ok(regions)
    }
}
