use serde::{Deserialize, Serialize};

use crate::lanes::PerLane;

/// Frame size the lanes are laid out for before the first frame arrives.
pub const DEFAULT_FRAME_WIDTH: usize = 640;
pub const DEFAULT_FRAME_HEIGHT: usize = 480;

/// Tunable parameters of the motion race.
///
/// Updated between ticks by whatever drives the UI; read by the next tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RacerParams {
    /// Motion threshold compared against the mean RGB difference (`0..=255`).
    ///
    /// Not clamped. Values around `0..128` are useful.
    pub threshold: f32,
    /// Lerp factor of the instant-score smoother. Clamped to `[0, 1]` on use.
    pub smoothing: f32,
    /// Progress gain per lane, captured when a race starts. Not clamped.
    pub gains: PerLane<f32>,
    /// Pointer distance (pixels) within which a lane corner can be picked.
    pub pick_radius: f32,
}

impl Default for RacerParams {
    fn default() -> Self {
        Self {
            threshold: 30.0,
            smoothing: 0.2,
            gains: PerLane::splat(0.5),
            pick_radius: 15.0,
        }
    }
}
