//! Per-lane motion energy, area normalisation and smoothing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lanes::{LaneId, LaneSet, PerLane};

/// Instant scores closer than this count as a live tie.
pub const LIVE_TIE_EPSILON: f32 = 0.01;

/// Largest per-pixel difference; normalisation divides by `area * MAX_DIFF`.
pub const MAX_DIFF: f32 = 255.0;

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Motion density of one lane: `sum / (area * 255)`, or 0 for an empty lane.
///
/// Not clamped: dense, strong motion over a small lane can exceed 1.
pub fn normalize_motion(sum: f64, area: f32) -> f32 {
    if area > 0.0 {
        (sum / (area as f64 * MAX_DIFF as f64)) as f32
    } else {
        0.0
    }
}

/// Accumulates motion magnitudes per lane during one scan.
///
/// A pixel is tested against both lanes independently, so it may count for
/// neither, one or both.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LaneTally {
    sums: PerLane<f64>,
}

impl LaneTally {
    #[inline]
    pub fn add(&mut self, lanes: &LaneSet, x: f32, y: f32, d: f32) {
        for lane in LaneId::ALL {
            if lanes.lane(lane).contains(x, y) {
                self.sums[lane] += d as f64;
            }
        }
    }

    pub fn sums(&self) -> PerLane<f64> {
        self.sums
    }

    pub fn normalize(&self, areas: PerLane<f32>) -> PerLane<f32> {
        self.sums
            .zip(areas)
            .map(|(sum, area)| normalize_motion(sum, area))
    }
}

/// Smoothed "who is moving more right now" scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaneScorer {
    instant: PerLane<f32>,
    normalized: PerLane<f32>,
}

impl LaneScorer {
    /// Fold one tick of normalised motion into the instant scores.
    ///
    /// `smoothing` is clamped to `[0, 1]`: 0 freezes the scores, 1 tracks the
    /// raw values exactly.
    pub fn update(&mut self, normalized: PerLane<f32>, smoothing: f32) -> PerLane<f32> {
        let t = smoothing.clamp(0.0, 1.0);
        self.normalized = normalized;
        self.instant = self
            .instant
            .zip(normalized)
            .map(|(score, raw)| lerp(score, raw, t));
        self.instant
    }

    pub fn instant(&self) -> PerLane<f32> {
        self.instant
    }

    /// Raw normalised values from the last scored tick.
    pub fn normalized(&self) -> PerLane<f32> {
        self.normalized
    }

    pub fn comparison(&self) -> LiveComparison {
        LiveComparison::classify(self.instant)
    }
}

/// Display-only comparison of the instant scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiveComparison {
    Tie,
    Stronger(LaneId),
}

impl LiveComparison {
    pub fn classify(instant: PerLane<f32>) -> Self {
        let diff = instant.left - instant.right;
        if diff.abs() < LIVE_TIE_EPSILON {
            LiveComparison::Tie
        } else if diff > 0.0 {
            LiveComparison::Stronger(LaneId::Left)
        } else {
            LiveComparison::Stronger(LaneId::Right)
        }
    }
}

impl fmt::Display for LiveComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiveComparison::Tie => write!(f, "Live motion: Tie"),
            LiveComparison::Stronger(lane) => {
                write!(f, "Live motion: {} stronger", lane.to_string().to_uppercase())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalisation_guards_empty_lanes() {
        assert_eq!(normalize_motion(1000.0, 0.0), 0.0);
        assert_relative_eq!(normalize_motion(255.0 * 50.0, 100.0), 0.5);
        // Saturating motion over a tiny lane is allowed past 1.
        assert!(normalize_motion(255.0 * 400.0, 100.0) > 1.0);
    }

    #[test]
    fn tally_counts_overlapping_pixels_for_both_lanes() {
        let mut lanes = LaneSet::split_halves(10, 10);
        let corner = crate::CornerRef::new(LaneId::Left, 1).expect("corner");
        lanes.set_corner(corner, 10.0, 0.0);

        let mut tally = LaneTally::default();
        tally.add(&lanes, 8.0, 0.0, 100.0);
        tally.add(&lanes, 1.0, 9.0, 50.0);
        assert_eq!(tally.sums(), PerLane::new(150.0, 100.0));
    }

    #[test]
    fn full_smoothing_tracks_raw_value() {
        let mut scorer = LaneScorer::default();
        let raw = PerLane::new(0.37, 0.81);
        assert_eq!(scorer.update(raw, 1.0), raw);
        assert_eq!(scorer.normalized(), raw);
    }

    #[test]
    fn zero_smoothing_freezes_scores() {
        let mut scorer = LaneScorer::default();
        scorer.update(PerLane::new(0.9, 0.4), 0.0);
        assert_eq!(scorer.instant(), PerLane::splat(0.0));
    }

    #[test]
    fn smoothing_is_clamped() {
        let mut scorer = LaneScorer::default();
        let raw = PerLane::new(0.5, 0.25);
        assert_eq!(scorer.update(raw, 3.0), raw);
        assert_eq!(scorer.update(PerLane::splat(1.0), -2.0), raw);
    }

    #[test]
    fn partial_smoothing_is_first_order() {
        let mut scorer = LaneScorer::default();
        scorer.update(PerLane::new(1.0, 0.0), 0.2);
        scorer.update(PerLane::new(1.0, 0.0), 0.2);
        assert_relative_eq!(scorer.instant().left, 0.36, epsilon = 1e-6);
    }

    #[test]
    fn live_comparison_labels() {
        let tie = LiveComparison::classify(PerLane::new(0.500, 0.505));
        assert_eq!(tie, LiveComparison::Tie);
        assert_eq!(tie.to_string(), "Live motion: Tie");

        let left = LiveComparison::classify(PerLane::new(0.3, 0.1));
        assert_eq!(left.to_string(), "Live motion: LEFT stronger");

        let right = LiveComparison::classify(PerLane::new(0.1, 0.3));
        assert_eq!(right, LiveComparison::Stronger(LaneId::Right));
        assert_eq!(right.to_string(), "Live motion: RIGHT stronger");
    }
}
