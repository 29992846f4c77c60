use image::{Rgb, RgbImage};

use crate::shared::rectangle::Rectangle;

/// Domain interface for drawing regions onto an image buffer.
///
/// Implementations modify the image in place and clip to its bounds;
/// parts of a rectangle outside the image are ignored.
pub trait RegionPainter: Send + Sync {
    /// Draw a border `stroke` pixels thick, centred on the edges at `x`,
    /// `x + width`, `y` and `y + height`.
    fn outline(&self, image: &mut RgbImage, rect: &Rectangle, color: Rgb<u8>, stroke: u32);

    /// Paint every pixel of `[x, x + width] × [y, y + height]`.
    fn fill(&self, image: &mut RgbImage, rect: &Rectangle, color: Rgb<u8>);
}
