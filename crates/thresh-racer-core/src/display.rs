//! Read-only snapshot of everything a renderer draws for one tick.

use serde::Serialize;

use crate::lanes::{Lane, PerLane};
use crate::race::RaceStatus;
use crate::scoring::LiveComparison;

/// Lane outline for drawing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LaneOutline {
    pub corners: [[f32; 2]; 4],
    pub area: f32,
}

impl From<&Lane> for LaneOutline {
    fn from(lane: &Lane) -> Self {
        Self {
            corners: lane.corners().map(|p| [p.x, p.y]),
            area: lane.area(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DisplayState {
    /// Frames fed so far, warm-up frames included.
    pub tick: u64,
    /// The detector has no comparable previous frame yet.
    pub warming_up: bool,
    pub lanes: PerLane<LaneOutline>,
    pub instant: PerLane<f32>,
    pub normalized: PerLane<f32>,
    pub progress: PerLane<f32>,
    pub race_active: bool,
    pub status: RaceStatus,
    pub status_label: String,
    pub live: LiveComparison,
    pub live_label: String,
}
