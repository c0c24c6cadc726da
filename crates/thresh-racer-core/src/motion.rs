//! Frame differencing against the previous frame.
//!
//! The detector keeps one previous frame. Each scan compares the incoming
//! frame with it pixel by pixel, reports motion pixels to a visitor, paints
//! the binary debug mask and then keeps the incoming frame as the new
//! previous frame.

use log::debug;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::image::{Frame, FrameView};

/// Mask value written for motion pixels.
pub const MASK_ON: u8 = 255;

/// Mean absolute difference over the first three channels, in `[0, 255]`.
#[inline]
pub fn pixel_difference(current: &[u8], previous: &[u8]) -> f32 {
    let sum: u16 = current[..3]
        .iter()
        .zip(&previous[..3])
        .map(|(&c, &p)| c.abs_diff(p) as u16)
        .sum();
    sum as f32 / 3.0
}

/// Counts from one completed scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MotionSummary {
    /// Pixels whose difference exceeded the threshold.
    pub motion_pixels: usize,
    pub total_pixels: usize,
}

/// Result of feeding one frame to the detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionScan {
    /// No comparable previous frame; the frame was stored and nothing scored.
    WarmingUp,
    Scanned(MotionSummary),
}

#[derive(Clone, Debug)]
pub struct MotionDetector {
    previous: Option<Frame>,
    mask: Option<Frame>,
    mask_enabled: bool,
}

impl Default for MotionDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionDetector {
    pub fn new() -> Self {
        Self {
            previous: None,
            mask: None,
            mask_enabled: true,
        }
    }

    /// Toggle painting of the debug mask. Scanning is unaffected.
    pub fn set_mask_enabled(&mut self, enabled: bool) {
        self.mask_enabled = enabled;
        if !enabled {
            self.mask = None;
        }
    }

    /// Binary mask from the last scanned tick: 0 or 255 in the first three
    /// channels, 255 in any further channel.
    pub fn mask(&self) -> Option<FrameView<'_>> {
        self.mask.as_ref().map(Frame::view)
    }

    /// Compare `frame` with the previous one.
    ///
    /// `on_motion(x, y, d)` is called for every pixel with `d > threshold`,
    /// in row-major order. Nothing is reported while warming up.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "debug",
            skip(self, frame, on_motion),
            fields(width = frame.width(), height = frame.height())
        )
    )]
    pub fn scan<F>(&mut self, frame: FrameView<'_>, threshold: f32, mut on_motion: F) -> MotionScan
    where
        F: FnMut(usize, usize, f32),
    {
        let previous = match &mut self.previous {
            Some(prev) if prev.matches(&frame) => prev,
            Some(prev) => {
                debug!(
                    "frame layout changed {}x{}x{} -> {}x{}x{}; detector warming up",
                    prev.width(),
                    prev.height(),
                    prev.channels(),
                    frame.width(),
                    frame.height(),
                    frame.channels()
                );
                prev.copy_from(frame);
                self.mask = None;
                return MotionScan::WarmingUp;
            }
            None => {
                debug!(
                    "first frame {}x{}x{}; detector warming up",
                    frame.width(),
                    frame.height(),
                    frame.channels()
                );
                self.previous = Some(Frame::from_view(frame));
                return MotionScan::WarmingUp;
            }
        };

        let mut mask = if self.mask_enabled {
            Some(mask_buffer(&mut self.mask, frame))
        } else {
            None
        };

        let width = frame.width();
        let channels = frame.channels();
        let row_len = width * channels;
        let mut motion_pixels = 0;

        let rows = frame
            .data()
            .chunks_exact(row_len)
            .zip(previous.data().chunks_exact(row_len));
        for (y, (cur_row, prev_row)) in rows.enumerate() {
            let pixels = cur_row
                .chunks_exact(channels)
                .zip(prev_row.chunks_exact(channels));
            for (x, (cur, prev)) in pixels.enumerate() {
                let d = pixel_difference(cur, prev);
                let is_motion = d > threshold;

                if let Some(mask) = mask.as_deref_mut() {
                    let idx = y * row_len + x * channels;
                    let value = if is_motion { MASK_ON } else { 0 };
                    mask[idx..idx + 3].fill(value);
                }

                if is_motion {
                    motion_pixels += 1;
                    on_motion(x, y, d);
                }
            }
        }

        previous.copy_from(frame);

        MotionScan::Scanned(MotionSummary {
            motion_pixels,
            total_pixels: frame.width() * frame.height(),
        })
    }
}

/// Mask storage matching `frame`, reallocated only when the layout changes.
fn mask_buffer<'m>(slot: &'m mut Option<Frame>, frame: FrameView<'_>) -> &'m mut [u8] {
    let stale = slot.as_ref().map_or(true, |mask| !mask.matches(&frame));
    if stale {
        let (w, h, c) = (frame.width(), frame.height(), frame.channels());
        // Channels past RGB stay opaque; the scan only writes the first three.
        let data = vec![MASK_ON; w * h * c];
        *slot = Frame::new(w, h, c, data).ok();
    }
    slot.as_mut().map(Frame::data_mut).unwrap_or_default()
}
