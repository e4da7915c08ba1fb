//! orofacial-io: File I/O for orofacial tracking.
//!
//! This crate loads binary masks from images and HDF5 tongue archives,
//! converts jaw label exports to CSV, and writes tip time series.
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod jaw;
pub mod mask_image;
mod writer;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use self::hdf5::{write_tongue_archive, write_tongue_archive_with, TongueArchive};
pub use jaw::{convert_jaw_file, convert_jaw_labels, convert_jaw_tree, JawConversionSummary};
pub use mask_image::{
    load_mask_image, mask_from_image, mask_to_image, save_mask_image, save_tip_overlay, tip_overlay,
};
pub use writer::TipCsvWriter;
