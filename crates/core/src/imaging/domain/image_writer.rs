use std::path::Path;

use image::RgbImage;

use crate::shared::error::PrivacyError;

/// Persists an RGB buffer, overwriting whatever is at `path`.
pub trait ImageWriter: Send + Sync {
    fn write(&self, path: &Path, image: &RgbImage) -> Result<(), PrivacyError>;
}
