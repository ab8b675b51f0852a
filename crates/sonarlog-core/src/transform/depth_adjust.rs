use rayon::prelude::*;
use tracing::{debug, info};

use crate::consts::{DISTANCE_TIE_TOLERANCE_M, PARALLEL_PAIR_THRESHOLD};
use crate::error::{Result, SonarError};
use crate::frame::{DepthPoint, Frame, Length};

/// The closest base/adjust pair over both sequences.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NearestMatch {
    pub base: DepthPoint,
    pub adjust: DepthPoint,
    /// Position of `base` in the base sequence.
    pub base_position: usize,
    /// Position of `adjust` in the sequence being adjusted.
    pub adjust_position: usize,
    pub distance_m: f64,
}

impl NearestMatch {
    /// Correction that moves the adjusted sequence onto the base depth reference.
    pub fn depth_difference(&self) -> Length {
        self.base.depth - self.adjust.depth
    }
}

/// Result of a depth adjustment: the anchor pair and the corrected frames.
#[derive(Clone, Debug)]
pub struct DepthAdjustment {
    pub nearest: NearestMatch,
    pub difference: Length,
    /// Copies of every to-adjust frame with the correction applied.
    pub frames: Vec<Frame>,
}

/// Aligns the depth reference of one capture with another over the same terrain.
///
/// The correction is a single scalar: the depth difference at the globally
/// nearest pair of points. It is added to every frame of `to_adjust`.
pub struct DepthAdjuster<'a> {
    base: &'a [Frame],
    to_adjust: &'a [Frame],
}

impl<'a> DepthAdjuster<'a> {
    pub fn new(base: &'a [Frame], to_adjust: &'a [Frame]) -> Self {
        Self { base, to_adjust }
    }

    /// Exhaustive nearest-pair search.
    ///
    /// Ties within [`DISTANCE_TIE_TOLERANCE_M`] go to the earlier to-adjust
    /// point, then to the earlier base point.
    pub fn find_nearest(&self) -> Result<NearestMatch> {
        if self.base.is_empty() || self.to_adjust.is_empty() {
            return Err(SonarError::InvalidInput(format!(
                "nearest-point search needs two non-empty sequences (base: {}, to adjust: {})",
                self.base.len(),
                self.to_adjust.len()
            )));
        }

        let base: Vec<DepthPoint> = self.base.iter().map(Frame::depth_point).collect();
        let nearest_for = |(position, frame): (usize, &Frame)| {
            nearest_in(&base, position, frame.depth_point())
        };

        let pairs = base.len().saturating_mul(self.to_adjust.len());
        let best = if pairs >= PARALLEL_PAIR_THRESHOLD {
            self.to_adjust
                .par_iter()
                .enumerate()
                .map(nearest_for)
                .reduce_with(closer)
        } else {
            self.to_adjust
                .iter()
                .enumerate()
                .map(nearest_for)
                .reduce(closer)
        };

        best.ok_or_else(|| SonarError::Pipeline("nearest-point search produced no pair".into()))
    }

    /// Find the anchor pair and correct every to-adjust frame.
    pub fn adjust_depth(&self) -> Result<DepthAdjustment> {
        self.adjust_depth_observed(|_| {})
    }

    /// Like [`adjust_depth`](Self::adjust_depth), calling `on_match` with the
    /// anchor pair before the correction is applied.
    pub fn adjust_depth_observed(
        &self,
        on_match: impl FnOnce(&NearestMatch),
    ) -> Result<DepthAdjustment> {
        let nearest = self.find_nearest()?;
        info!(
            base = %nearest.base.point,
            base_depth_m = nearest.base.depth.meters(),
            adjust = %nearest.adjust.point,
            adjust_depth_m = nearest.adjust.depth.meters(),
            distance_m = nearest.distance_m,
            "Nearest points found"
        );
        on_match(&nearest);

        let difference = nearest.depth_difference();
        let frames: Vec<Frame> = self
            .to_adjust
            .iter()
            .map(|frame| {
                let mut adjusted = frame.clone();
                adjusted.depth = frame.depth + difference;
                adjusted
            })
            .collect();
        debug!(
            difference_m = difference.meters(),
            frames = frames.len(),
            "Depth adjustment applied"
        );

        Ok(DepthAdjustment {
            nearest,
            difference,
            frames,
        })
    }
}

fn nearest_in(base: &[DepthPoint], adjust_position: usize, adjust: DepthPoint) -> NearestMatch {
    let mut best = NearestMatch {
        base: base[0],
        adjust,
        base_position: 0,
        adjust_position,
        distance_m: base[0].point.distance_to(&adjust.point),
    };
    for (position, candidate) in base.iter().enumerate().skip(1) {
        let distance_m = candidate.point.distance_to(&adjust.point);
        if distance_m < best.distance_m - DISTANCE_TIE_TOLERANCE_M {
            best.base = *candidate;
            best.base_position = position;
            best.distance_m = distance_m;
        }
    }
    best
}

/// Keeps `a` (the earlier candidate) unless `b` is strictly closer.
fn closer(a: NearestMatch, b: NearestMatch) -> NearestMatch {
    if b.distance_m < a.distance_m - DISTANCE_TIE_TOLERANCE_M {
        b
    } else {
        a
    }
}
