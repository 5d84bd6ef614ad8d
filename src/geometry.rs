//! Rectangle arithmetic in top-origin layout units.
//!
//! All geometry in this crate uses page coordinates with the origin at the
//! top-left corner, so "below" means a larger y value. The extractor flips
//! PDF-native (bottom-left) coordinates at span construction time.

/// An axis-aligned rectangle: (x0, y0) is the top-left corner, (x1, y1) the
/// bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Horizontal midpoint.
    pub fn mid_x(&self) -> f32 {
        (self.x0 + self.x1) / 2.0
    }

    /// Strict horizontal containment: `x` lies inside the open interval
    /// (x0, x1). Points exactly on an edge do not count.
    pub fn contains_x(&self, x: f32) -> bool {
        self.x0 < x && x < self.x1
    }

    /// Vertical gap from this rectangle's bottom edge to `other`'s top edge.
    /// Positive when `other` starts below this rectangle.
    pub fn gap_below(&self, other: &Rect) -> f32 {
        other.y0 - self.y1
    }

    /// A rectangle with no vertical extent cannot be cropped or rendered.
    pub fn is_degenerate(&self) -> bool {
        self.y1 <= self.y0
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}
