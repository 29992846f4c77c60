use std::path::Path;

use image::RgbImage;

use crate::shared::error::PrivacyError;

/// Loads a raster image into an owned RGB buffer.
///
/// Every call decodes the source afresh; callers own the returned buffer
/// exclusively for the duration of their operation.
pub trait ImageReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<RgbImage, PrivacyError>;
}
