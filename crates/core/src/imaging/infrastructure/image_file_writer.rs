use std::path::Path;

use image::{ImageFormat, RgbImage};

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::error::PrivacyError;

/// Encodes an RGB buffer with the `image` crate; the format follows the
/// output path's extension.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, image: &RgbImage) -> Result<(), PrivacyError> {
        let write_error = |source| PrivacyError::ImageWrite {
            path: path.to_path_buf(),
            source,
        };
        // Unsupported extensions fail here, before anything touches disk.
        let format = ImageFormat::from_path(path).map_err(write_error)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        image.save_with_format(path, format).map_err(write_error)
    }
}
