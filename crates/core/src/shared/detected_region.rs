use serde::Serialize;

use crate::shared::rectangle::Rectangle;

/// Which locator produced a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionSource {
    Face,
    Text,
}

/// A located region awaiting redaction.
///
/// `label` and `confidence` are only ever set for text-sourced regions.
/// Created by a locator, consumed once by the aggregator, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DetectedRegion {
    pub rectangle: Rectangle,
    pub source: RegionSource,
    pub label: Option<String>,
    pub confidence: Option<f32>,
}

impl DetectedRegion {
    pub fn face(rectangle: Rectangle) -> Self {
        Self {
            rectangle,
            source: RegionSource::Face,
            label: None,
            confidence: None,
        }
    }

    pub fn text(rectangle: Rectangle, label: String, confidence: Option<f32>) -> Self {
        Self {
            rectangle,
            source: RegionSource::Text,
            label: Some(label),
            confidence,
        }
    }

    /// Extracts the bare rectangles, preserving order.
    pub fn rectangles(regions: &[DetectedRegion]) -> Vec<Rectangle> {
        regions.iter().map(|r| r.rectangle).collect()
    }
}
