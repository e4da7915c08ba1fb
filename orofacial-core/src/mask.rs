//! Binary mask type.

use crate::error::{Error, Result};
use crate::point::Pixel;
use crate::point_set::PointSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A `height x width` grid of booleans, `true` marking foreground.
///
/// Cells are stored row-major: cell `(x, y)` lives at `y * width + x`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<bool>,
}

impl Mask {
    /// Creates an all-background mask.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![false; width as usize * height as usize],
        }
    }

    /// Wraps a row-major buffer.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `data.len() != width * height`.
    pub fn from_vec(width: u32, height: u32, data: Vec<bool>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Builds a mask from rows of equal length.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if the rows are ragged, or
    /// `InvalidInput` if the extent does not fit in `u32`.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self> {
        let width = rows.first().map_or(0, |row| row.as_ref().len());
        let mut data = Vec::with_capacity(width * rows.len());
        for row in rows {
            let row = row.as_ref();
            if row.len() != width {
                return Err(Error::DimensionMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        let width = u32::try_from(width)
            .map_err(|_| Error::InvalidInput(format!("mask width {width} too large")))?;
        let height = u32::try_from(rows.len())
            .map_err(|_| Error::InvalidInput(format!("mask height {} too large", rows.len())))?;
        Self::from_vec(width, height, data)
    }

    /// Builds a mask by evaluating `f(x, y)` for every cell.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> bool,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Builds a mask of the given extent with `pixels` set to foreground.
    ///
    /// # Errors
    /// Returns `OutOfBounds` for the first pixel outside the extent.
    pub fn from_pixels(width: u32, height: u32, pixels: &PointSet) -> Result<Self> {
        let mut mask = Self::new(width, height);
        for pixel in pixels.iter() {
            mask.set(pixel.x, pixel.y, true)?;
        }
        Ok(mask)
    }

    /// Mask width (columns).
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height (rows).
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major view of the cells.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.data
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Returns the cell at `(x, y)`, or `None` outside the extent.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        (x < self.width && y < self.height).then(|| self.data[self.index(x, y)])
    }

    /// Returns true if `(x, y)` is inside the extent and foreground.
    #[inline]
    #[must_use]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.get(x, y).unwrap_or(false)
    }

    /// Sets the cell at `(x, y)`.
    ///
    /// # Errors
    /// Returns `OutOfBounds` outside the extent.
    pub fn set(&mut self, x: u32, y: u32, value: bool) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let index = self.index(x, y);
        self.data[index] = value;
        Ok(())
    }

    /// Number of foreground cells.
    #[must_use]
    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    /// Returns true if no cell is foreground.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Foreground pixels in row-major scan order.
    #[must_use]
    pub fn pixels(&self) -> PointSet {
        let mut set = PointSet::with_capacity(self.foreground_count());
        for y in 0..self.height {
            let row = &self.data[self.index(0, y)..][..self.width as usize];
            for (x, _) in (0..self.width).zip(row).filter(|(_, &v)| v) {
                set.push(Pixel::new(x, y));
            }
        }
        set
    }

    /// True if `(x, y)` is foreground and at least one of its 8 neighbours
    /// is background. Neighbours outside the extent are skipped, so a
    /// foreground pixel on the image edge is not a boundary pixel by that
    /// fact alone.
    #[must_use]
    pub fn is_boundary(&self, x: u32, y: u32) -> bool {
        if !self.is_foreground(x, y) {
            return false;
        }
        let x_range = x.saturating_sub(1)..=x.saturating_add(1).min(self.width - 1);
        let y_range = y.saturating_sub(1)..=y.saturating_add(1).min(self.height - 1);
        y_range
            .flat_map(|ny| x_range.clone().map(move |nx| (nx, ny)))
            .any(|(nx, ny)| !self.data[self.index(nx, ny)])
    }
}
