use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::redaction::domain::region_painter::RegionPainter;
use crate::shared::rectangle::Rectangle;

/// Region painter over `imageproc` drawing primitives.
///
/// Both edges of a rectangle are painted: a mask over `(x, y, w, h)` spans
/// columns `x..=x+w` and rows `y..=y+h`, and outlines sit on those edges.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageprocPainter;

impl RegionPainter for ImageprocPainter {
    fn outline(&self, image: &mut RgbImage, rect: &Rectangle, color: Rgb<u8>, stroke: u32) {
        // Nested 1-px borders, from `inset` pixels inside the edge outwards.
        let inset = (stroke / 2) as i64;
        for ring in 0..stroke as i64 {
            let grow = ring - inset;
            if let Some(r) = to_rect(rect, grow) {
                draw_hollow_rect_mut(image, r, color);
            }
        }
    }

    fn fill(&self, image: &mut RgbImage, rect: &Rectangle, color: Rgb<u8>) {
        if let Some(r) = to_rect(rect, 0) {
            draw_filled_rect_mut(image, r, color);
        }
    }
}

/// Inclusive span of `rect` grown by `grow` pixels on every side; `None`
/// when nothing is left.
fn to_rect(rect: &Rectangle, grow: i64) -> Option<Rect> {
    let width = rect.width() as i64 + 1 + 2 * grow;
    let height = rect.height() as i64 + 1 + 2 * grow;
    if width <= 0 || height <= 0 {
        return None;
    }
    let x = i32::try_from(rect.x() as i64 - grow).ok()?;
    let y = i32::try_from(rect.y() as i64 - grow).ok()?;
    Some(Rect::at(x, y).of_size(u32::try_from(width).ok()?, u32::try_from(height).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn white(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, WHITE)
    }

    // ── Fill ─────────────────────────────────────────────────────────

    #[test]
    fn test_fill_covers_both_end_edges() {
        let mut img = white(20, 20);
        let rect = Rectangle::new(5, 5, 4, 3);
        ImageprocPainter.fill(&mut img, &rect, RED);

        for (x, y, px) in img.enumerate_pixels() {
            let expected = if rect.covers(x as i32, y as i32) { RED } else { WHITE };
            assert_eq!(*px, expected, "pixel ({x}, {y})");
        }
        assert_eq!(*img.get_pixel(9, 8), RED);
        assert_eq!(*img.get_pixel(10, 8), WHITE);
        assert_eq!(*img.get_pixel(9, 9), WHITE);
    }

    #[test]
    fn test_fill_reaches_last_pixel_under_fractional_polygon() {
        let polygon = [(2.7, 2.2), (8.9, 2.2), (8.9, 6.99), (2.7, 6.99)];
        let rect = Rectangle::bounding(&polygon).unwrap();
        assert_eq!(rect, Rectangle::new(2, 2, 6, 4));

        let mut img = white(12, 10);
        ImageprocPainter.fill(&mut img, &rect, RED);

        // Column 8 and row 6 lie under the polygon.
        assert_eq!(*img.get_pixel(8, 4), RED);
        assert_eq!(*img.get_pixel(5, 6), RED);
        assert_eq!(*img.get_pixel(9, 4), WHITE);
        assert_eq!(*img.get_pixel(5, 7), WHITE);
    }

    #[test]
    fn test_fill_clips_to_image() {
        let mut img = white(10, 10);
        ImageprocPainter.fill(&mut img, &Rectangle::new(-5, 7, 8, 20), RED);
        assert_eq!(*img.get_pixel(0, 9), RED);
        assert_eq!(*img.get_pixel(3, 7), RED);
        assert_eq!(*img.get_pixel(4, 7), WHITE);
        assert_eq!(*img.get_pixel(0, 6), WHITE);
    }

    #[test]
    fn test_fill_outside_image_is_noop() {
        let mut img = white(10, 10);
        ImageprocPainter.fill(&mut img, &Rectangle::new(50, 50, 5, 5), RED);
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_fill_zero_width_paints_one_column() {
        let mut img = white(10, 10);
        ImageprocPainter.fill(&mut img, &Rectangle::new(2, 2, 0, 5), RED);
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(*img.get_pixel(2, 7), RED);
        assert_eq!(*img.get_pixel(3, 4), WHITE);
        assert_eq!(img.pixels().filter(|p| **p == RED).count(), 6);
    }

    // ── Outline ──────────────────────────────────────────────────────

    #[test]
    fn test_outline_is_centred_on_both_edges() {
        let mut img = white(30, 30);
        ImageprocPainter.outline(&mut img, &Rectangle::new(10, 10, 10, 10), RED, 3);

        // Left edge x=10 and right edge x=20, one pixel either side.
        for x in [9, 10, 11, 19, 20, 21] {
            assert_eq!(*img.get_pixel(x, 15), RED, "x={x}");
        }
        for x in [8, 12, 18, 22] {
            assert_eq!(*img.get_pixel(x, 15), WHITE, "x={x}");
        }
        // Bottom edge y=20.
        assert_eq!(*img.get_pixel(15, 21), RED);
        assert_eq!(*img.get_pixel(15, 22), WHITE);
        // Interior untouched.
        assert_eq!(*img.get_pixel(15, 15), WHITE);
    }

    #[test]
    fn test_outline_single_pixel_stroke() {
        let mut img = white(20, 20);
        ImageprocPainter.outline(&mut img, &Rectangle::new(5, 5, 5, 5), RED, 1);
        assert_eq!(*img.get_pixel(5, 7), RED);
        assert_eq!(*img.get_pixel(10, 7), RED);
        assert_eq!(*img.get_pixel(4, 7), WHITE);
        assert_eq!(*img.get_pixel(9, 7), WHITE);
        assert_eq!(*img.get_pixel(11, 7), WHITE);
    }

    #[test]
    fn test_outline_partly_outside_image() {
        let mut img = white(10, 10);
        ImageprocPainter.outline(&mut img, &Rectangle::new(-3, -3, 8, 8), RED, 3);
        assert_eq!(*img.get_pixel(5, 0), RED);
        assert_eq!(*img.get_pixel(0, 0), WHITE);
    }

    #[test]
    fn test_outline_zero_stroke_draws_nothing() {
        let mut img = white(10, 10);
        ImageprocPainter.outline(&mut img, &Rectangle::new(2, 2, 4, 4), RED, 0);
        assert!(img.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_outline_tiny_rect() {
        let mut img = white(10, 10);
        ImageprocPainter.outline(&mut img, &Rectangle::new(4, 4, 1, 1), RED, 3);
        assert_eq!(*img.get_pixel(4, 4), RED);
        assert_eq!(*img.get_pixel(5, 5), RED);
        assert_eq!(*img.get_pixel(3, 3), RED);
    }

    #[test]
    fn test_to_rect_spans_are_inclusive() {
        let r = to_rect(&Rectangle::new(3, 4, 5, 6), 0).unwrap();
        assert_eq!((r.left(), r.top(), r.width(), r.height()), (3, 4, 6, 7));
        assert!(to_rect(&Rectangle::new(0, 0, 0, 0), 0).is_some());
    }

    #[test]
    fn test_to_rect_shrinks_to_nothing() {
        assert!(to_rect(&Rectangle::new(0, 0, 1, 1), -1).is_none());
        assert!(to_rect(&Rectangle::new(0, 0, 2, 2), -1).is_some());
    }
}
