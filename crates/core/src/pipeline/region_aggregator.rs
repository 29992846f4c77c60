use crate::shared::detected_region::DetectedRegion;
use crate::shared::rectangle::Rectangle;

/// Concatenates face and text rectangles into one redaction worklist.
///
/// Faces come first, then text, each in its original order. Duplicates and
/// overlaps are kept; every rectangle is painted independently.
pub fn aggregate(face_rects: &[Rectangle], text_rects: &[Rectangle]) -> Vec<Rectangle> {
    let mut all = Vec::with_capacity(face_rects.len() + text_rects.len());
    all.extend_from_slice(face_rects);
    all.extend_from_slice(text_rects);
    all
}

/// [`aggregate`] over detected regions, consuming them.
pub fn aggregate_regions(faces: Vec<DetectedRegion>, texts: Vec<DetectedRegion>) -> Vec<Rectangle> {
    faces
        .into_iter()
        .chain(texts)
        .map(|region| region.rectangle)
        .collect()
}
