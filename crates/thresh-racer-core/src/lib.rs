//! Core of the ThreshRacer motion race.
//!
//! Two quadrilateral lanes are watched for frame-to-frame pixel change. Each
//! new frame runs one tick:
//!
//! 1. [`MotionDetector`] differences the frame against the previous one and
//!    thresholds the mean RGB difference into a motion mask.
//! 2. [`LaneTally`] sums the motion magnitude inside each lane and
//!    [`LaneScorer`] normalises it by lane area and smooths it.
//! 3. [`Race`] turns the normalised values into progress towards 100%.
//!
//! [`ThreshRacer`] owns all of it. The crate does no capture, windowing or
//! drawing; callers feed [`FrameView`]s and read back a [`DisplayState`].
//!
//! ```
//! use thresh_racer_core::{Frame, RacerParams, ThreshRacer, TickOutcome};
//!
//! let mut racer = ThreshRacer::new(64, 48, RacerParams::default());
//! racer.start_race();
//!
//! let still = Frame::filled(64, 48, [0, 0, 0])?;
//! let flash = Frame::filled(64, 48, [255, 255, 255])?;
//! assert_eq!(racer.tick(still.view()), TickOutcome::WarmingUp);
//! racer.tick(flash.view());
//!
//! println!("{}", racer.display_state().status_label);
//! # Ok::<(), thresh_racer_core::FrameError>(())
//! ```

mod display;
mod engine;
mod geometry;
mod image;
mod lanes;
mod logger;
mod motion;
mod params;
mod race;
mod scoring;

pub use display::{DisplayState, LaneOutline};
pub use engine::{ThreshRacer, TickOutcome};
pub use geometry::{point_in_polygon, polygon_area, Polygon};
pub use image::{Frame, FrameError, FrameView};
pub use lanes::{CornerDrag, CornerRef, Lane, LaneId, LaneSet, PerLane, CORNERS_PER_LANE};
pub use motion::{pixel_difference, MotionDetector, MotionScan, MotionSummary, MASK_ON};
pub use params::{RacerParams, DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
pub use race::{percent, Race, RaceStatus, FINISH_TIE_EPSILON};
pub use scoring::{
    lerp, normalize_motion, LaneScorer, LaneTally, LiveComparison, LIVE_TIE_EPSILON, MAX_DIFF,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
