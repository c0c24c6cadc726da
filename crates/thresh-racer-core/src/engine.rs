//! One object owning the whole per-tick pipeline.

use log::debug;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::display::{DisplayState, LaneOutline};
use crate::image::FrameView;
use crate::lanes::{CornerDrag, CornerRef, LaneId, LaneSet, PerLane};
use crate::motion::{MotionDetector, MotionScan};
use crate::params::{RacerParams, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
use crate::race::Race;
use crate::scoring::{LaneScorer, LaneTally};

/// What one call to [`ThreshRacer::tick`] did.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickOutcome {
    /// The frame was stored as the reference; nothing was scored.
    WarmingUp,
    Scored {
        normalized: PerLane<f32>,
        instant: PerLane<f32>,
        motion_pixels: usize,
        /// This tick pushed a lane to 100% and ended the race.
        race_finished: bool,
    },
}

/// Motion race state: lanes, detector, scorer and race.
///
/// Parameter setters and corner edits apply to the next [`tick`](Self::tick).
#[derive(Clone, Debug)]
pub struct ThreshRacer {
    params: RacerParams,
    lanes: LaneSet,
    drag: CornerDrag,
    detector: MotionDetector,
    scorer: LaneScorer,
    race: Race,
    ticks: u64,
    warming_up: bool,
}

impl Default for ThreshRacer {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT, RacerParams::default())
    }
}

impl ThreshRacer {
    /// Lanes start as the left and right halves of a `width × height` frame.
    pub fn new(width: usize, height: usize, params: RacerParams) -> Self {
        Self::with_lanes(LaneSet::split_halves(width, height), params)
    }

    pub fn with_lanes(lanes: LaneSet, params: RacerParams) -> Self {
        Self {
            params,
            lanes,
            drag: CornerDrag::default(),
            detector: MotionDetector::new(),
            scorer: LaneScorer::default(),
            race: Race::new(),
            ticks: 0,
            warming_up: true,
        }
    }

    pub fn params(&self) -> &RacerParams {
        &self.params
    }

    pub fn set_params(&mut self, params: RacerParams) {
        self.params = params;
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.params.threshold = threshold;
    }

    pub fn set_smoothing(&mut self, smoothing: f32) {
        self.params.smoothing = smoothing;
    }

    /// Takes effect at the next [`start_race`](Self::start_race).
    pub fn set_gain(&mut self, lane: LaneId, gain: f32) {
        self.params.gains[lane] = gain;
    }

    pub fn set_pick_radius(&mut self, radius: f32) {
        self.params.pick_radius = radius;
    }

    /// Skip painting the diff mask while nobody is looking at it.
    pub fn set_mask_enabled(&mut self, enabled: bool) {
        self.detector.set_mask_enabled(enabled);
    }

    pub fn lanes(&self) -> &LaneSet {
        &self.lanes
    }

    pub fn set_corner(&mut self, corner: CornerRef, x: f32, y: f32) {
        self.lanes.set_corner(corner, x, y);
    }

    /// Pointer pressed: pick the nearest corner within the pick radius.
    pub fn press(&mut self, x: f32, y: f32) -> Option<CornerRef> {
        self.drag.press(&self.lanes, x, y, self.params.pick_radius)
    }

    /// Pointer moved while pressed: move the picked corner.
    pub fn drag_to(&mut self, x: f32, y: f32) -> bool {
        self.drag.drag_to(&mut self.lanes, x, y)
    }

    pub fn release(&mut self) {
        self.drag.release();
    }

    pub fn dragging(&self) -> Option<CornerRef> {
        self.drag.active()
    }

    /// Reset progress and start racing with the current gains.
    pub fn start_race(&mut self) {
        self.race.start(self.params.gains);
    }

    pub fn race(&self) -> &Race {
        &self.race
    }

    pub fn scorer(&self) -> &LaneScorer {
        &self.scorer
    }

    /// Binary motion mask of the last scored tick.
    pub fn diff_mask(&self) -> Option<FrameView<'_>> {
        self.detector.mask()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run detection, scoring and the race for one new frame.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self, frame),
            fields(tick = self.ticks + 1, width = frame.width(), height = frame.height())
        )
    )]
    pub fn tick(&mut self, frame: FrameView<'_>) -> TickOutcome {
        self.ticks += 1;

        let lanes = &self.lanes;
        let mut tally = LaneTally::default();
        let scan = self
            .detector
            .scan(frame, self.params.threshold, |x, y, d| {
                tally.add(lanes, x as f32, y as f32, d)
            });

        let summary = match scan {
            MotionScan::WarmingUp => {
                self.warming_up = true;
                return TickOutcome::WarmingUp;
            }
            MotionScan::Scanned(summary) => summary,
        };
        self.warming_up = false;

        let normalized = tally.normalize(self.lanes.areas());
        let instant = self.scorer.update(normalized, self.params.smoothing);
        let race_finished = self.race.advance(normalized);

        debug!(
            "tick {}: motion {}/{} px, norm L {:.4} R {:.4}, instant L {:.4} R {:.4}",
            self.ticks,
            summary.motion_pixels,
            summary.total_pixels,
            normalized.left,
            normalized.right,
            instant.left,
            instant.right
        );

        TickOutcome::Scored {
            normalized,
            instant,
            motion_pixels: summary.motion_pixels,
            race_finished,
        }
    }

    /// Snapshot for the renderer.
    pub fn display_state(&self) -> DisplayState {
        let status = self.race.status();
        let live = self.scorer.comparison();
        let lanes = self.lanes.lanes();
        DisplayState {
            tick: self.ticks,
            warming_up: self.warming_up,
            lanes: PerLane::new(
                LaneOutline::from(&lanes.left),
                LaneOutline::from(&lanes.right),
            ),
            instant: self.scorer.instant(),
            normalized: self.scorer.normalized(),
            progress: self.race.progress(),
            race_active: self.race.is_active(),
            status,
            status_label: status.to_string(),
            live,
            live_label: live.to_string(),
        }
    }
}
