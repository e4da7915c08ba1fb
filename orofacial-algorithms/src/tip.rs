//! Tongue-tip localization.
//!
//! Given a binary mask of a segmented tongue and a rough guess of which way
//! the tip points, the locator narrows the foreground pixels in two passes:
//!
//! 1. Pixels far from the body centroid `c1` (beyond the nearest-rank
//!    distance percentile) and inside a wide cone around the hint. Their
//!    mean is the refined centroid `c2`.
//! 2. Outline pixels of that set inside a narrow cone around `c2 - c1`.
//!    Their mean is the tip.
//!
//! An empty pass falls back to the centroid of the previous stage.
//! All arithmetic is `f64`; centroids are accumulated exactly in integers,
//! so repeated calls on the same input return bit-identical points.

use orofacial_core::{
    angle_between, nearest_rank_percentile, DirectionVector, Error, Mask, Pixel, Point, PointSet,
    Result,
};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tip locator configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TipConfig {
    /// Drop pixels closer to the centroid than the distance percentile.
    pub use_distance_filter: bool,
    /// Nearest-rank percentile of centroid distances (fraction in `[0, 1]`).
    pub distance_percentile: f64,
    /// Truncate the distance cutoff to a whole number of pixels before
    /// comparing, as the archived tracking scripts did.
    pub integer_cutoff: bool,
    /// Half-angle (degrees) of the cone around the direction hint.
    pub coarse_cone_deg: f64,
    /// Half-angle (degrees) of the cone around the refined direction.
    pub fine_cone_deg: f64,
    /// Run the per-pixel passes on the rayon thread pool.
    pub parallel: bool,
    /// Pixel sets no larger than this are processed sequentially.
    pub min_parallel_len: usize,
}

impl Default for TipConfig {
    fn default() -> Self {
        Self {
            use_distance_filter: true,
            distance_percentile: 0.75,
            integer_cutoff: false,
            coarse_cone_deg: 45.0,
            fine_cone_deg: 15.0,
            parallel: true,
            min_parallel_len: 4096,
        }
    }
}

impl TipConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration without the distance prefilter.
    ///
    /// Suited to masks whose elongation axis is ambiguous, such as a bottom
    /// view where the tongue is wider than it is long.
    #[must_use]
    pub fn without_distance_filter() -> Self {
        Self::default().with_distance_filter(false)
    }

    /// Enable or disable the distance prefilter.
    #[must_use]
    pub fn with_distance_filter(mut self, enabled: bool) -> Self {
        self.use_distance_filter = enabled;
        self
    }

    /// Set the distance percentile fraction.
    #[must_use]
    pub fn with_distance_percentile(mut self, fraction: f64) -> Self {
        self.distance_percentile = fraction;
        self
    }

    /// Truncate the distance cutoff toward zero.
    ///
    /// Reproduces tip locations computed by the archived tracking scripts.
    #[must_use]
    pub fn with_integer_cutoff(mut self, enabled: bool) -> Self {
        self.integer_cutoff = enabled;
        self
    }

    /// Set the coarse cone half-angle in degrees.
    #[must_use]
    pub fn with_coarse_cone(mut self, degrees: f64) -> Self {
        self.coarse_cone_deg = degrees;
        self
    }

    /// Set the fine cone half-angle in degrees.
    #[must_use]
    pub fn with_fine_cone(mut self, degrees: f64) -> Self {
        self.fine_cone_deg = degrees;
        self
    }

    /// Set whether to use parallel processing.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checks the numeric parameters.
    ///
    /// # Errors
    /// Returns `InvalidInput` for a percentile outside `[0, 1]` or a cone
    /// angle outside `(0, 180]`.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.distance_percentile) {
            return Err(Error::InvalidInput(format!(
                "distance percentile {} outside [0, 1]",
                self.distance_percentile
            )));
        }
        for (name, value) in [
            ("coarse cone", self.coarse_cone_deg),
            ("fine cone", self.fine_cone_deg),
        ] {
            if !(value > 0.0 && value <= 180.0) {
                return Err(Error::InvalidInput(format!(
                    "{name} angle {value} outside (0, 180]"
                )));
            }
        }
        Ok(())
    }
}

/// Which stage produced the returned tip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TipStage {
    /// No pixel passed the coarse filter; the tip is the body centroid.
    BaseCentroid,
    /// No outline pixel passed the fine filter; the tip is the refined centroid.
    RefinedCentroid,
    /// Mean of the outline pixels in the fine cone.
    BoundaryTip,
}

impl TipStage {
    /// Short lowercase name, used in CSV output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TipStage::BaseCentroid => "base_centroid",
            TipStage::RefinedCentroid => "refined_centroid",
            TipStage::BoundaryTip => "boundary_tip",
        }
    }
}

impl std::fmt::Display for TipStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tip location together with the intermediate results that produced it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TipEstimate {
    /// Estimated tip coordinate.
    pub tip: Point,
    /// Stage that produced `tip`.
    pub stage: TipStage,
    /// Centroid of the whole mask (`c1`).
    pub base_centroid: Point,
    /// Pixels that passed the coarse filter.
    pub coarse_candidates: usize,
    /// Outline pixels that passed the fine filter.
    pub fine_candidates: usize,
}

/// Locates the tip of an elongated mask along a hinted direction.
#[derive(Clone, Debug, Default)]
pub struct TipLocator {
    config: TipConfig,
}

impl TipLocator {
    /// Create with custom configuration.
    #[must_use]
    pub fn new(config: TipConfig) -> Self {
        Self { config }
    }

    /// Get current configuration.
    #[must_use]
    pub fn config(&self) -> &TipConfig {
        &self.config
    }

    /// Returns the estimated tip coordinate.
    ///
    /// # Errors
    /// See [`TipLocator::locate_detailed`].
    pub fn locate(&self, mask: &Mask, hint: DirectionVector) -> Result<Point> {
        self.locate_detailed(mask, hint).map(|estimate| estimate.tip)
    }

    /// Returns the tip and the stage diagnostics.
    ///
    /// # Errors
    /// - `InvalidInput` if `hint` is zero-length or not finite, or the
    ///   configuration is invalid.
    /// - `EmptyMask` if the mask has no foreground pixels.
    pub fn locate_detailed(&self, mask: &Mask, hint: DirectionVector) -> Result<TipEstimate> {
        self.config.validate()?;
        if hint.is_zero() || !hint.is_finite() {
            return Err(Error::InvalidInput(format!(
                "direction hint ({}, {}) has no direction",
                hint.dx, hint.dy
            )));
        }

        let points = mask.pixels();
        let c1 = points.centroid().ok_or(Error::EmptyMask)?;

        let coarse_cone = self.config.coarse_cone_deg;
        let coarse_keep = if self.config.use_distance_filter {
            let mut distances = self.map_points(&points, |p| (p.to_point() - c1).norm());
            let mut cutoff =
                nearest_rank_percentile(&mut distances, self.config.distance_percentile)
                    .ok_or(Error::EmptyMask)?;
            if self.config.integer_cutoff {
                cutoff = cutoff.trunc();
            }
            log::debug!(
                "tip: {} pixels, c1=({:.2}, {:.2}), distance cutoff {cutoff:.3}",
                points.len(),
                c1.x,
                c1.y
            );
            self.map_points(&points, |p| {
                let v = p.to_point() - c1;
                v.norm() > cutoff && angle_between(&v, &hint) < coarse_cone
            })
        } else {
            self.map_points(&points, |p| {
                angle_between(&(p.to_point() - c1), &hint) < coarse_cone
            })
        };
        let coarse = points.select(&coarse_keep);

        let Some(c2) = coarse.centroid() else {
            log::debug!("tip: no coarse candidates, falling back to base centroid");
            return Ok(TipEstimate {
                tip: c1,
                stage: TipStage::BaseCentroid,
                base_centroid: c1,
                coarse_candidates: 0,
                fine_candidates: 0,
            });
        };

        let refined = c2 - c1;
        let fine_cone = self.config.fine_cone_deg;
        let fine_keep = self.map_points(&coarse, |p| {
            angle_between(&(p.to_point() - c1), &refined) < fine_cone
                && mask.is_boundary(p.x, p.y)
        });
        let fine = coarse.select(&fine_keep);

        let estimate = match fine.centroid() {
            Some(tip) => TipEstimate {
                tip,
                stage: TipStage::BoundaryTip,
                base_centroid: c1,
                coarse_candidates: coarse.len(),
                fine_candidates: fine.len(),
            },
            None => TipEstimate {
                tip: c2,
                stage: TipStage::RefinedCentroid,
                base_centroid: c1,
                coarse_candidates: coarse.len(),
                fine_candidates: 0,
            },
        };
        log::debug!(
            "tip: {} coarse, {} fine candidates -> ({:.2}, {:.2}) [{}]",
            estimate.coarse_candidates,
            estimate.fine_candidates,
            estimate.tip.x,
            estimate.tip.y,
            estimate.stage
        );
        Ok(estimate)
    }

    /// Applies `f` to every pixel, preserving order.
    fn map_points<T, F>(&self, points: &PointSet, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(Pixel) -> T + Sync + Send,
    {
        if self.config.parallel && points.len() > self.config.min_parallel_len {
            points
                .x
                .par_iter()
                .zip(points.y.par_iter())
                .map(|(&x, &y)| f(Pixel::new(x, y)))
                .collect()
        } else {
            points.iter().map(f).collect()
        }
    }
}

/// Locates the tongue tip with the default cone angles and percentile.
///
/// # Errors
/// - `EmptyMask` if the mask has no foreground pixels.
/// - `InvalidInput` if `direction_hint` is zero-length.
pub fn locate_tip(
    mask: &Mask,
    direction_hint: DirectionVector,
    use_distance_filter: bool,
) -> Result<Point> {
    TipLocator::new(TipConfig::default().with_distance_filter(use_distance_filter))
        .locate(mask, direction_hint)
}

/// [`locate_tip`] without the distance prefilter.
///
/// # Errors
/// Same as [`locate_tip`].
pub fn locate_tip_no_distance_filter(mask: &Mask, direction_hint: DirectionVector) -> Result<Point> {
    locate_tip(mask, direction_hint, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rect(width: u32, height: u32, x0: u32, y0: u32, w: u32, h: u32) -> Mask {
        Mask::from_fn(width, height, |x, y| {
            (x0..x0 + w).contains(&x) && (y0..y0 + h).contains(&y)
        })
    }

    #[test]
    fn test_empty_mask() {
        let mask = Mask::new(16, 9);
        let err = locate_tip(&mask, DirectionVector::new(1.0, 0.0), true).unwrap_err();
        assert_eq!(err, Error::EmptyMask);
    }

    #[test]
    fn test_zero_hint() {
        let mask = rect(10, 10, 2, 2, 4, 4);
        let err = locate_tip(&mask, DirectionVector::new(0.0, 0.0), true).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_nan_hint() {
        let mask = rect(10, 10, 2, 2, 4, 4);
        let err = locate_tip(&mask, DirectionVector::new(f64::NAN, 1.0), true).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_invalid_config() {
        let mask = rect(10, 10, 2, 2, 4, 4);
        let hint = DirectionVector::new(1.0, 0.0);
        for config in [
            TipConfig::default().with_distance_percentile(1.5),
            TipConfig::default().with_coarse_cone(0.0),
            TipConfig::default().with_fine_cone(200.0),
        ] {
            let err = TipLocator::new(config).locate(&mask, hint).unwrap_err();
            assert!(matches!(err, Error::InvalidInput(_)));
        }
    }

    #[test]
    fn test_single_pixel_base_centroid() {
        let mut mask = Mask::new(10, 10);
        mask.set(5, 5, true).unwrap();
        let estimate = TipLocator::default()
            .locate_detailed(&mask, DirectionVector::new(-1.0, 1.0))
            .unwrap();
        assert_eq!(estimate.stage, TipStage::BaseCentroid);
        assert_eq!(estimate.tip, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_single_pixel_without_distance_filter() {
        let mut mask = Mask::new(10, 10);
        mask.set(5, 5, true).unwrap();
        let estimate = TipLocator::new(TipConfig::without_distance_filter())
            .locate_detailed(&mask, DirectionVector::new(0.0, -3.0))
            .unwrap();
        // The lone pixel sits on c1, so the zero-vector angle keeps it.
        assert_eq!(estimate.stage, TipStage::BoundaryTip);
        assert_eq!(estimate.tip, Point::new(5.0, 5.0));
    }

    #[test]
    fn test_rectangle_right_tip() {
        // 20x4 bar at x in 5..25, y in 3..7.
        let mask = rect(30, 10, 5, 3, 20, 4);
        let estimate = TipLocator::default()
            .locate_detailed(&mask, DirectionVector::new(1.0, 0.0))
            .unwrap();
        assert_eq!(estimate.stage, TipStage::BoundaryTip);
        // Coarse set is the last two columns; fine set is the last column
        // plus the two corner pixels of the column before it.
        assert_eq!(estimate.coarse_candidates, 8);
        assert_eq!(estimate.fine_candidates, 6);
        assert_abs_diff_eq!(estimate.tip.x, 24.0 - 1.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(estimate.tip.y, 4.5, epsilon = 1e-9);
    }

    #[test]
    fn test_integer_cutoff_widens_coarse_set() {
        // Same bar as above: the cutoff 7.65 truncates to 7, which lets the
        // third column from the right (distances just above 7.5) through.
        let mask = rect(30, 10, 5, 3, 20, 4);
        let hint = DirectionVector::new(1.0, 0.0);
        let exact = TipLocator::default().locate_detailed(&mask, hint).unwrap();
        let truncated = TipLocator::new(TipConfig::default().with_integer_cutoff(true))
            .locate_detailed(&mask, hint)
            .unwrap();

        assert_eq!(exact.coarse_candidates, 8);
        assert_eq!(truncated.coarse_candidates, 12);
        assert_eq!(truncated.stage, TipStage::BoundaryTip);
        // Right column plus top and bottom pixels of the two columns before it.
        assert_eq!(truncated.fine_candidates, 8);
        assert_abs_diff_eq!(truncated.tip.x, 23.25, epsilon = 1e-9);
        assert_abs_diff_eq!(truncated.tip.y, 4.5, epsilon = 1e-9);
        assert_ne!(exact.tip, truncated.tip);
    }

    #[test]
    fn test_integer_cutoff_ignored_without_distance_filter() {
        let mask = rect(30, 10, 5, 3, 20, 4);
        let hint = DirectionVector::new(-1.0, 0.0);
        let plain = TipLocator::new(TipConfig::without_distance_filter())
            .locate_detailed(&mask, hint)
            .unwrap();
        let config = TipConfig::without_distance_filter().with_integer_cutoff(true);
        let truncated = TipLocator::new(config).locate_detailed(&mask, hint).unwrap();
        assert_eq!(plain, truncated);
    }

    #[test]
    fn test_rectangle_left_tip() {
        let mask = rect(30, 10, 5, 3, 20, 4);
        let tip = locate_tip(&mask, DirectionVector::new(-1.0, 0.0), true).unwrap();
        assert_abs_diff_eq!(tip.x, 5.0 + 1.0 / 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(tip.y, 4.5, epsilon = 1e-9);
    }

    #[test]
    fn test_refined_centroid_fallback() {
        // A solid mask filling the whole image has no boundary pixels,
        // because out-of-bounds neighbours are not background.
        let mask = Mask::from_fn(12, 4, |_, _| true);
        let estimate = TipLocator::default()
            .locate_detailed(&mask, DirectionVector::new(1.0, 0.0))
            .unwrap();
        assert_eq!(estimate.stage, TipStage::RefinedCentroid);
        assert_eq!(estimate.fine_candidates, 0);
        assert!(estimate.tip.x > estimate.base_centroid.x);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mask = Mask::from_fn(200, 120, |x, y| {
            let dx = f64::from(x) - 80.0;
            let dy = f64::from(y) - 60.0;
            (dx / 70.0).powi(2) + (dy / 25.0).powi(2) <= 1.0
        });
        let hint = DirectionVector::new(1.0, 0.3);
        let config = TipConfig {
            min_parallel_len: 64,
            ..TipConfig::default()
        };
        let parallel = TipLocator::new(config.clone()).locate_detailed(&mask, hint).unwrap();
        let sequential = TipLocator::new(config.with_parallel(false))
            .locate_detailed(&mask, hint)
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(TipStage::BaseCentroid.to_string(), "base_centroid");
        assert_eq!(TipStage::RefinedCentroid.as_str(), "refined_centroid");
        assert_eq!(TipStage::BoundaryTip.as_str(), "boundary_tip");
    }
}
