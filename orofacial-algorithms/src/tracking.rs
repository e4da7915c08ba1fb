//! Multi-frame helpers that combine mask cleanup and tip location.

use crate::components::keep_largest_component;
use crate::tip::{TipEstimate, TipLocator};
use orofacial_core::{DirectionVector, Mask, Result};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-frame preprocessing options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackOptions {
    /// Drop everything but the largest 4-connected component first.
    pub keep_largest_component: bool,
}

impl TrackOptions {
    /// Sets whether to keep only the largest component.
    #[must_use]
    pub fn with_largest_component(mut self, enabled: bool) -> Self {
        self.keep_largest_component = enabled;
        self
    }
}

/// Outcome of locating the tip in one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameResult {
    /// Frame number as given by the caller.
    pub frame: usize,
    /// Tip estimate, or the reason the frame has none.
    pub outcome: Result<TipEstimate>,
}

/// Locates the tip in one frame after optional cleanup.
///
/// # Errors
/// Propagates the locator's `EmptyMask` / `InvalidInput` errors.
pub fn track_frame(
    mask: &Mask,
    hint: DirectionVector,
    locator: &TipLocator,
    options: &TrackOptions,
) -> Result<TipEstimate> {
    if options.keep_largest_component {
        locator.locate_detailed(&keep_largest_component(mask), hint)
    } else {
        locator.locate_detailed(mask, hint)
    }
}

/// Locates the tip in every frame, in parallel across frames.
///
/// Results keep the input order. A failing frame does not stop the batch;
/// its error is stored in [`FrameResult::outcome`].
pub fn track_frames(
    frames: Vec<(usize, Mask)>,
    hint: DirectionVector,
    locator: &TipLocator,
    options: &TrackOptions,
) -> Vec<FrameResult> {
    let results: Vec<FrameResult> = frames
        .into_par_iter()
        .map(|(frame, mask)| FrameResult {
            frame,
            outcome: track_frame(&mask, hint, locator, options),
        })
        .collect();

    let failed = results.iter().filter(|r| r.outcome.is_err()).count();
    for result in &results {
        if let Err(err) = &result.outcome {
            log::warn!("frame {}: {err}", result.frame);
        }
    }
    log::info!(
        "located tips in {} of {} frames",
        results.len() - failed,
        results.len()
    );
    results
}
