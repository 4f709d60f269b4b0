//! Integer rectangles and points in image space.
//!
//! Bounds of every image are a [`Rect`] with an inclusive minimum and an
//! exclusive maximum corner. The origin does not have to be `(0, 0)`:
//! images cropped out of larger ones keep their original coordinates, and
//! negative coordinates are valid.
//!
//! ```text
//! (min_x,min_y) ───────► X
//!   │   ┌──────────┐
//!   │   │  pixels  │
//!   │   └──────────┘ (max_x,max_y) exclusive
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use filtra_core::Rect;
//!
//! let r = Rect::new(-1, -1, 3, 1);
//! assert_eq!(r.width(), 4);
//! assert_eq!(r.height(), 2);
//! assert!(r.contains(-1, 0));
//! assert!(!r.contains(3, 0));
//!
//! let clipped = r.intersect(&Rect::new(0, 0, 10, 10));
//! assert_eq!(clipped, Rect::new(0, 0, 3, 1));
//! ```

use std::fmt;

/// A point with integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// X coordinate.
    pub x: i32,
    /// Y coordinate.
    pub y: i32,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0, y: 0 };

    /// Creates a point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `min` inclusive and `max` exclusive.
///
/// # Invariants
///
/// `min_x <= max_x` and `min_y <= max_y`; [`Rect::new`] swaps reversed
/// corners. A rectangle with zero width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left edge (inclusive).
    pub min_x: i32,
    /// Top edge (inclusive).
    pub min_y: i32,
    /// Right edge (exclusive).
    pub max_x: i32,
    /// Bottom edge (exclusive).
    pub max_y: i32,
}

impl Rect {
    /// The zero rectangle, returned for every empty intersection.
    pub const EMPTY: Rect = Rect {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
    };

    /// Creates a rectangle from two corners, swapping reversed coordinates.
    #[inline]
    pub const fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let (min_x, max_x) = if x0 > x1 { (x1, x0) } else { (x0, x1) };
        let (min_y, max_y) = if y0 > y1 { (y1, y0) } else { (y0, y1) };
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a rectangle at the origin. Negative sizes give an empty rect.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        let w = if width > 0 { width } else { 0 };
        let h = if height > 0 { height } else { 0 };
        Self {
            min_x: 0,
            min_y: 0,
            max_x: w,
            max_y: h,
        }
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    /// Top-left corner.
    #[inline]
    pub const fn min(&self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    /// Number of pixels covered.
    #[inline]
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width() as usize * self.height() as usize
        }
    }

    /// Returns true when the rectangle covers no pixels.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    /// Returns true when `(x, y)` lies inside.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Returns the overlap of two rectangles, or [`Rect::EMPTY`].
    pub fn intersect(&self, other: &Rect) -> Rect {
        let r = Rect {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        };
        if r.is_empty() { Rect::EMPTY } else { r }
    }

    /// Shifts the rectangle by `(dx, dy)`.
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Same size, moved so that the top-left corner is `(0, 0)`.
    #[inline]
    pub const fn to_origin(&self) -> Rect {
        self.translate(-self.min_x, -self.min_y)
    }

    /// Clamps `x` into `[min_x, max_x - 1]`.
    #[inline]
    pub fn clamp_x(&self, x: i32) -> i32 {
        if x < self.min_x {
            self.min_x
        } else if x > self.max_x - 1 {
            self.max_x - 1
        } else {
            x
        }
    }

    /// Clamps `y` into `[min_y, max_y - 1]`.
    #[inline]
    pub fn clamp_y(&self, y: i32) -> i32 {
        if y < self.min_y {
            self.min_y
        } else if y > self.max_y - 1 {
            self.max_y - 1
        } else {
            y
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{})-({},{})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_size() {
        let r = Rect::new(-1, -1, 3, 1);
        assert_eq!(r.width(), 4);
        assert_eq!(r.height(), 2);
        assert_eq!(r.area(), 8);
        assert!(!r.is_empty());
    }

    #[test]
    fn test_rect_canonical() {
        assert_eq!(Rect::new(3, 1, -1, -1), Rect::new(-1, -1, 3, 1));
        assert_eq!(Rect::from_size(-5, 3), Rect::new(0, 0, 0, 3));
        assert!(Rect::from_size(-5, 3).is_empty());
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, -5, 20, 5);
        assert_eq!(a.intersect(&b), Rect::new(5, 0, 10, 5));

        let c = Rect::new(20, 20, 30, 30);
        assert_eq!(a.intersect(&c), Rect::EMPTY);
    }

    #[test]
    fn test_rect_translate() {
        let r = Rect::new(2, 3, 5, 7);
        assert_eq!(r.to_origin(), Rect::new(0, 0, 3, 4));
        assert_eq!(r.translate(-2, 1), Rect::new(0, 4, 3, 8));
    }

    #[test]
    fn test_rect_clamp() {
        let r = Rect::new(-2, 0, 3, 4);
        assert_eq!(r.clamp_x(-10), -2);
        assert_eq!(r.clamp_x(7), 2);
        assert_eq!(r.clamp_y(2), 2);
        assert_eq!(r.clamp_y(4), 3);
    }

    #[test]
    fn test_rect_display() {
        assert_eq!(Rect::new(0, 0, 4, 2).to_string(), "(0,0)-(4,2)");
    }
}
