//! High-level facade for the ThreshRacer motion race.
//!
//! This crate provides:
//! - re-exports of the pipeline in `thresh-racer-core`
//! - (feature `image`) conversions between `image` buffers and core frames,
//!   and a replay driver that races over a directory of still frames
//! - (feature `cli`) the `thresh-racer` binary
//!
//! ## Quickstart
//!
//! ```no_run
//! use thresh_racer::frames::{load_rgb, rgb_view};
//! use thresh_racer::{RacerParams, ThreshRacer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let a = load_rgb("frame_000.png")?;
//! let b = load_rgb("frame_001.png")?;
//!
//! let mut racer = ThreshRacer::new(a.width() as usize, a.height() as usize, RacerParams::default());
//! racer.start_race();
//! racer.tick(rgb_view(&a)?);
//! racer.tick(rgb_view(&b)?);
//! println!("{}", racer.display_state().status_label);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `thresh_racer::core`: the whole core crate.
//! - `thresh_racer::frames` (feature `image`): `image::RgbImage` interop.
//! - `thresh_racer::replay` (feature `image`): directory replay and its config.

pub use thresh_racer_core as core;

pub use thresh_racer_core::{
    CornerRef, DisplayState, Frame, FrameError, FrameView, LaneId, LaneSet, PerLane, Race,
    RaceStatus, RacerParams, ThreshRacer, TickOutcome,
};

#[cfg(feature = "image")]
pub mod frames;

#[cfg(feature = "image")]
pub mod replay;
