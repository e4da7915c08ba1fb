//! Geometry primitives shared by the tip locator.
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]

use crate::point::DirectionVector;

/// Angle between two vectors in degrees, in `[0, 180]`.
///
/// Computed as `degrees(acos(clip(u.v / (|u| |v|), -1, 1)))`. If either
/// vector has zero length the angle is defined as 0, so a pixel sitting
/// exactly on the centroid is never rejected by an angular test.
#[inline]
#[must_use]
pub fn angle_between(u: &DirectionVector, v: &DirectionVector) -> f64 {
    let nu = u.norm();
    let nv = v.norm();
    if nu == 0.0 || nv == 0.0 {
        return 0.0;
    }
    (u.dot(v) / (nu * nv)).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Zero-based index of the nearest-rank percentile in a sorted list of
/// `len` values: `floor(fraction * len)`, clamped to the last element.
///
/// No interpolation is performed.
#[must_use]
pub fn nearest_rank_index(len: usize, fraction: f64) -> usize {
    let index = (fraction * len as f64).floor() as usize;
    index.min(len.saturating_sub(1))
}

/// Nearest-rank percentile of `values`, reordering them in place.
///
/// Returns `None` for an empty slice. NaNs sort after every finite value.
pub fn nearest_rank_percentile(values: &mut [f64], fraction: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let index = nearest_rank_index(values.len(), fraction);
    let (_, value, _) = values.select_nth_unstable_by(index, f64::total_cmp);
    Some(*value)
}
