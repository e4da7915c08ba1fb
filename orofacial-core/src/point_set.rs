//! Structure of Arrays (`SoA`) storage for pixel positions.
//!
//! `PointSet` keeps the column and row of each pixel in two parallel
//! vectors. Masks produce them in row-major scan order, so a point set
//! derived from the same mask is always identical.
#![allow(clippy::cast_precision_loss)]

use crate::point::{Pixel, Point};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered set of pixel positions stored in `SoA` format.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointSet {
    /// Columnar storage for X coordinates (columns).
    pub x: Vec<u32>,
    /// Columnar storage for Y coordinates (rows).
    pub y: Vec<u32>,
}

impl PointSet {
    /// Creates a new empty set with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            x: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of pixels in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Clears both columns.
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
    }

    /// Appends all pixels from another set to this one.
    pub fn append(&mut self, other: &PointSet) {
        self.x.extend_from_slice(&other.x);
        self.y.extend_from_slice(&other.y);
    }

    /// Pushes a single pixel.
    pub fn push(&mut self, pixel: Pixel) {
        self.x.push(pixel.x);
        self.y.push(pixel.y);
    }

    /// Returns the pixel at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Pixel> {
        Some(Pixel::new(*self.x.get(index)?, *self.y.get(index)?))
    }

    /// Iterates the pixels in storage order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = Pixel> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| Pixel::new(x, y))
    }

    /// Returns the subset whose entry in `keep` is true.
    ///
    /// `keep` is matched index by index; extra entries are ignored.
    #[must_use]
    pub fn select(&self, keep: &[bool]) -> PointSet {
        self.iter()
            .zip(keep)
            .filter_map(|(pixel, &k)| k.then_some(pixel))
            .collect()
    }

    /// Unweighted centroid (mean x, mean y).
    ///
    /// Coordinates are summed exactly as integers and divided once, so the
    /// result does not depend on summation order. Returns `None` when empty.
    #[must_use]
    pub fn centroid(&self) -> Option<Point> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let sum_x: u64 = self.x.iter().map(|&v| u64::from(v)).sum();
        let sum_y: u64 = self.y.iter().map(|&v| u64::from(v)).sum();
        Some(Point::new(sum_x as f64 / n, sum_y as f64 / n))
    }

    /// Inclusive bounding box as `(min, max)` corners.
    #[must_use]
    pub fn bounding_box(&self) -> Option<(Pixel, Pixel)> {
        let min_x = self.x.iter().copied().min()?;
        let max_x = self.x.iter().copied().max()?;
        let min_y = self.y.iter().copied().min()?;
        let max_y = self.y.iter().copied().max()?;
        Some((Pixel::new(min_x, min_y), Pixel::new(max_x, max_y)))
    }
}

impl FromIterator<Pixel> for PointSet {
    fn from_iter<I: IntoIterator<Item = Pixel>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = PointSet::with_capacity(iter.size_hint().0);
        for pixel in iter {
            set.push(pixel);
        }
        set
    }
}

impl Extend<Pixel> for PointSet {
    fn extend<I: IntoIterator<Item = Pixel>>(&mut self, iter: I) {
        for pixel in iter {
            self.push(pixel);
        }
    }
}
