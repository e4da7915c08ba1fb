//! HDF5 tongue archives.
//!
//! An archive stores one foreground pixel list per video frame as two
//! variable-length integer datasets of equal length: `heights` (rows) and
//! `widths` (columns). Two optional datasets of the same length may
//! accompany them: `frames`, the video frame number of each entry, and
//! `probs`, a variable-length list of per-pixel probabilities.

use crate::{Error, Result};
use hdf5::types::VarLenArray;
use hdf5::{Dataset, File, Group, H5Type};
use ndarray::{s, ArrayView1};
use orofacial_core::{Mask, Pixel, PointSet};
use std::path::Path;

const HEIGHTS: &str = "heights";
const WIDTHS: &str = "widths";
const FRAMES: &str = "frames";
const PROBS: &str = "probs";

/// Read access to a per-frame tongue pixel archive.
pub struct TongueArchive {
    _file: File,
    heights: Dataset,
    widths: Dataset,
    probs: Option<Dataset>,
    frame_numbers: Option<Vec<usize>>,
    frame_count: usize,
}

impl TongueArchive {
    /// Opens an archive and checks that its coordinate datasets line up.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, a required dataset is
    /// missing, or `heights`, `widths` and any `frames`/`probs` dataset
    /// differ in length.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let heights = file.dataset(HEIGHTS)?;
        let widths = file.dataset(WIDTHS)?;

        let frame_count = heights.size();
        if widths.size() != frame_count {
            return Err(Error::InvalidFormat(format!(
                "{HEIGHTS} has {frame_count} frames but {WIDTHS} has {}",
                widths.size()
            )));
        }

        let frame_numbers = read_dataset_vec_opt::<i64>(&file, FRAMES)?
            .map(|numbers| {
                if numbers.len() != frame_count {
                    return Err(Error::InvalidFormat(format!(
                        "{FRAMES} has {} entries but the archive has {frame_count} frames",
                        numbers.len()
                    )));
                }
                numbers
                    .into_iter()
                    .map(|n| {
                        usize::try_from(n)
                            .map_err(|_| Error::InvalidFormat(format!("negative frame number {n}")))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let probs = file.dataset(PROBS).ok();
        if let Some(probs) = &probs {
            if probs.size() != frame_count {
                return Err(Error::InvalidFormat(format!(
                    "{PROBS} has {} entries but the archive has {frame_count} frames",
                    probs.size()
                )));
            }
        }

        log::debug!(
            "opened tongue archive {} ({frame_count} frames, frame numbers: {}, probabilities: {})",
            path.as_ref().display(),
            frame_numbers.is_some(),
            probs.is_some()
        );

        Ok(Self {
            _file: file,
            heights,
            widths,
            probs,
            frame_numbers,
            frame_count,
        })
    }

    /// Number of frames in the archive.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Video frame numbers of the entries, if the archive stores them.
    #[must_use]
    pub fn frame_numbers(&self) -> Option<&[usize]> {
        self.frame_numbers.as_deref()
    }

    /// Video frame number of entry `index`; the index itself when the
    /// archive has no `frames` dataset.
    #[must_use]
    pub fn frame_number(&self, index: usize) -> usize {
        self.frame_numbers
            .as_ref()
            .and_then(|numbers| numbers.get(index).copied())
            .unwrap_or(index)
    }

    /// Per-pixel probabilities of one entry, if the archive stores them.
    ///
    /// # Errors
    /// Returns `FrameOutOfRange` for a missing entry, or an HDF5 error if the
    /// dataset cannot be read.
    pub fn probabilities(&self, frame: usize) -> Result<Option<Vec<f64>>> {
        if frame >= self.frame_count {
            return Err(Error::FrameOutOfRange {
                frame,
                count: self.frame_count,
            });
        }
        self.probs
            .as_ref()
            .map(|probs| read_frame_entry::<f64>(probs, frame))
            .transpose()
    }

    /// Foreground pixels of one frame, in stored order.
    ///
    /// # Errors
    /// Returns `FrameOutOfRange` for a missing frame and `InvalidFormat` for
    /// mismatched or negative coordinates.
    pub fn frame_pixels(&self, frame: usize) -> Result<PointSet> {
        if frame >= self.frame_count {
            return Err(Error::FrameOutOfRange {
                frame,
                count: self.frame_count,
            });
        }
        let rows = read_frame_entry::<i64>(&self.heights, frame)?;
        let cols = read_frame_entry::<i64>(&self.widths, frame)?;
        if rows.len() != cols.len() {
            return Err(Error::InvalidFormat(format!(
                "frame {frame}: {} rows but {} columns",
                rows.len(),
                cols.len()
            )));
        }

        rows.iter()
            .zip(cols.iter())
            .map(|(&y, &x)| {
                let x = u32::try_from(x);
                let y = u32::try_from(y);
                match (x, y) {
                    (Ok(x), Ok(y)) => Ok(Pixel::new(x, y)),
                    _ => Err(Error::InvalidFormat(format!(
                        "frame {frame}: coordinate out of range"
                    ))),
                }
            })
            .collect()
    }

    /// Expands one frame into a dense `height x width` mask.
    ///
    /// # Errors
    /// As [`TongueArchive::frame_pixels`]; also `InvalidFormat` if a pixel
    /// lies outside the requested extent.
    pub fn frame_mask(&self, frame: usize, height: u32, width: u32) -> Result<Mask> {
        let pixels = self.frame_pixels(frame)?;
        Mask::from_pixels(width, height, &pixels).map_err(|e| {
            Error::InvalidFormat(format!("frame {frame} does not fit {width}x{height}: {e}"))
        })
    }
}

fn read_frame_entry<T: H5Type + Copy>(dataset: &Dataset, frame: usize) -> Result<Vec<T>> {
    let entry = dataset.read_slice_1d::<VarLenArray<T>, _>(s![frame..=frame])?;
    Ok(entry
        .iter()
        .next()
        .map(|values| values.as_slice().to_vec())
        .unwrap_or_default())
}

fn read_dataset_vec_opt<T: H5Type>(group: &Group, name: &str) -> Result<Option<Vec<T>>> {
    match group.dataset(name) {
        Ok(dataset) => Ok(Some(dataset.read_raw::<T>()?)),
        Err(_) => Ok(None),
    }
}

fn to_var_len(values: &[u32]) -> VarLenArray<i64> {
    let widened: Vec<i64> = values.iter().map(|&v| i64::from(v)).collect();
    VarLenArray::from_slice(&widened)
}

/// Writes frames as a tongue archive (`heights` / `widths` datasets).
///
/// # Errors
/// Returns an error if the file or datasets cannot be created.
pub fn write_tongue_archive<P: AsRef<Path>>(path: P, frames: &[PointSet]) -> Result<()> {
    write_tongue_archive_with(path, frames, None, None)
}

/// Writes a tongue archive including the optional `frames` and `probs`
/// datasets.
///
/// # Errors
/// Returns `InvalidFormat` if an optional dataset does not have one entry
/// per frame, or an error if the file or datasets cannot be created.
pub fn write_tongue_archive_with<P: AsRef<Path>>(
    path: P,
    frames: &[PointSet],
    frame_numbers: Option<&[i64]>,
    probabilities: Option<&[Vec<f64>]>,
) -> Result<()> {
    let lengths = [
        frame_numbers.map(<[i64]>::len),
        probabilities.map(<[Vec<f64>]>::len),
    ];
    if lengths.into_iter().flatten().any(|len| len != frames.len()) {
        return Err(Error::InvalidFormat(format!(
            "optional datasets must have {} entries",
            frames.len()
        )));
    }

    let file = File::create(path)?;
    let heights: Vec<VarLenArray<i64>> = frames.iter().map(|set| to_var_len(&set.y)).collect();
    let widths: Vec<VarLenArray<i64>> = frames.iter().map(|set| to_var_len(&set.x)).collect();

    file.new_dataset_builder()
        .with_data(ArrayView1::from(&heights[..]))
        .create(HEIGHTS)?;
    file.new_dataset_builder()
        .with_data(ArrayView1::from(&widths[..]))
        .create(WIDTHS)?;

    if let Some(numbers) = frame_numbers {
        file.new_dataset_builder()
            .with_data(ArrayView1::from(numbers))
            .create(FRAMES)?;
    }
    if let Some(probabilities) = probabilities {
        let probs: Vec<VarLenArray<f64>> = probabilities
            .iter()
            .map(|values| VarLenArray::from_slice(values))
            .collect();
        file.new_dataset_builder()
            .with_data(ArrayView1::from(&probs[..]))
            .create(PROBS)?;
    }
    Ok(())
}
