//! orofacial-core: Core types for orofacial tracking analysis.
//!
//! This crate provides the binary [`Mask`] model, pixel and point types,
//! and the geometry primitives (angles, centroids, nearest-rank
//! percentiles) used by the tongue-tip locator.
//!

pub mod error;
pub mod geometry;
pub mod mask;
pub mod point;
pub mod point_set;

pub use error::{Error, Result};
pub use geometry::{angle_between, nearest_rank_index, nearest_rank_percentile};
pub use mask::Mask;
pub use point::{DirectionVector, Pixel, Point};
pub use point_set::PointSet;
