//! orofacial-algorithms: Mask analysis algorithms for orofacial tracking.
//!
//! This crate provides:
//! - **Tip location** - tongue-tip estimate from a binary mask and a direction hint
//! - **Component cleanup** - keep the largest 4-connected foreground blob
//! - **Tracking** - per-frame tip location across many masks in parallel
//!
#![warn(missing_docs)]

mod components;
mod tip;
mod tracking;

pub use components::{component_count, connected_components, keep_largest_component};
pub use tip::{
    locate_tip, locate_tip_no_distance_filter, TipConfig, TipEstimate, TipLocator, TipStage,
};
pub use tracking::{track_frame, track_frames, FrameResult, TrackOptions};

// Re-export core types used in the public API
pub use orofacial_core::{DirectionVector, Error, Mask, Point, Result};
