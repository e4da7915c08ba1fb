//! Pixel, point, and direction types.
//!
//! All coordinates are in image space: `x` is the column, `y` the row,
//! with `y` increasing downward.

use std::ops::Sub;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer pixel position inside a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pixel {
    /// Column index.
    pub x: u32,
    /// Row index.
    pub y: u32,
}

impl Pixel {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Returns the pixel position as a real-valued point.
    #[must_use]
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

/// Real-valued position in image space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// Horizontal coordinate (column).
    pub x: f64,
    /// Vertical coordinate (row).
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Point) -> f64 {
        (*self - *other).norm()
    }
}

impl Sub for Point {
    type Output = DirectionVector;

    fn sub(self, rhs: Point) -> DirectionVector {
        DirectionVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<Pixel> for Point {
    fn from(pixel: Pixel) -> Self {
        pixel.to_point()
    }
}

/// A 2D direction, e.g. the caller's guess of which way the tip points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DirectionVector {
    /// Horizontal component.
    pub dx: f64,
    /// Vertical component (positive = down).
    pub dy: f64,
}

impl DirectionVector {
    /// Creates a new direction vector.
    #[must_use]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &DirectionVector) -> f64 {
        self.dx * other.dx + self.dy * other.dy
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn norm(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Returns true if the vector has zero length.
    #[inline]
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    /// Returns true if both components are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }
}

impl From<(f64, f64)> for DirectionVector {
    fn from((dx, dy): (f64, f64)) -> Self {
        Self::new(dx, dy)
    }
}
