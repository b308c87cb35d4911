//! Grid and pixel coordinate primitives shared by the surface view and the
//! render pipeline.

use serde::{Deserialize, Serialize};

/// A position in cell coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Origin (0, 0).
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a new point.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Convert a flat cell index into a point for a grid of the given width.
    #[inline]
    pub fn from_index(index: usize, width: u16) -> Self {
        let w = width.max(1) as usize;
        Self {
            x: (index % w) as i32,
            y: (index / w) as i32,
        }
    }
}

/// A width/height pair in cell or pixel units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: u16,
    /// Vertical extent.
    pub height: u16,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Total number of cells covered by this size.
    #[inline]
    pub fn area(self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    /// Component-wise minimum.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self {
            width: self.width.min(other.width),
            height: self.height.min(other.height),
        }
    }
}

/// An axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Create a new rectangle.
    #[inline]
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[inline]
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Pixel size of the rectangle.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Check whether a pixel falls inside the rectangle.
    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x
            && py >= self.y
            && px < self.x + self.width as i32
            && py < self.y + self.height as i32
    }

    /// Translate by an offset.
    #[inline]
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}
