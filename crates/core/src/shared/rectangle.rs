use serde::Serialize;

/// An axis-aligned region in source-image pixel coordinates.
///
/// Overlapping rectangles are never merged; each one is painted on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Rectangle {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Axis-aligned bounding box of a (possibly skewed) polygon.
    ///
    /// Coordinates are truncated to integers: `x = min(xs)`, `y = min(ys)`,
    /// `width = max(xs) - min(xs)`, `height = max(ys) - min(ys)`.
    /// Returns `None` for an empty polygon.
    pub fn bounding(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (mut min_x, mut min_y) = *first;
        let (mut max_x, mut max_y) = *first;
        for &(px, py) in rest {
            min_x = min_x.min(px);
            min_y = min_y.min(py);
            max_x = max_x.max(px);
            max_y = max_y.max(py);
        }
        Some(Self {
            x: min_x as i32,
            y: min_y as i32,
            width: (max_x - min_x) as u32,
            height: (max_y - min_y) as u32,
        })
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && (px as i64) < self.right()
            && py >= self.y
            && (py as i64) < self.bottom()
    }

    /// Whether a mask painted over this rectangle reaches `(px, py)`.
    ///
    /// Masks include the end column and row (`x..=x+width`, `y..=y+height`)
    /// so the last pixel under a truncated polygon box is covered too.
    pub fn covers(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && (px as i64) <= self.right()
            && py >= self.y
            && (py as i64) <= self.bottom()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rectangle::new(x, y, span(x, right), span(y, bottom))
    }

    /// The four corners, clockwise from top-left.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let (l, t) = (self.x as f32, self.y as f32);
        let (r, b) = (self.right() as f32, self.bottom() as f32);
        [(l, t), (r, t), (r, b), (l, b)]
    }
}

fn span(start: i32, end: i64) -> u32 {
    u32::try_from(end - start as i64).unwrap_or(u32::MAX)
}
