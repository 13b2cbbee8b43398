use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world space (top-left origin, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict AABB overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Whether the vertical extents overlap (strict on both edges).
    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.bottom() > other.y && self.y < other.bottom()
    }
}

/// Euclidean distance between the centers of two rectangles.
pub fn center_distance(a: &Rect, b: &Rect) -> f32 {
    let (ax, ay) = a.center();
    let (bx, by) = b.center();
    ((bx - ax).powi(2) + (by - ay).powi(2)).sqrt()
}

/// Clamp `value` into `[lo, hi]`, resolving `lo > hi` toward `lo`.
///
/// `f32::clamp` panics when the bounds cross, which happens whenever a
/// viewport is wider than the world it shows.
pub fn clamp_low_biased(value: f32, lo: f32, hi: f32) -> f32 {
    lo.max(hi.min(value))
}
