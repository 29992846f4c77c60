use std::path::Path;

use image::RgbImage;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::error::PrivacyError;

/// Decodes PNG/JPEG/... files with the `image` crate.
///
/// Alpha is dropped; the pipeline works on 8-bit RGB only.
pub struct ImageFileReader;

impl ImageFileReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for ImageFileReader {
    fn read(&self, path: &Path) -> Result<RgbImage, PrivacyError> {
        let img = image::open(path).map_err(|source| PrivacyError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(img.into_rgb8())
    }
}
