//! Race over a directory of still frames.
//!
//! Frames are read in lexical file-name order, so zero-padded names such as
//! `frame_0001.png` replay in capture order.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use thresh_racer_core::{
    DisplayState, FrameError, LaneSet, PerLane, RacerParams, ThreshRacer, TickOutcome,
};

use crate::frames::{load_rgb, rgb_view, to_rgb_image, LoadError};

#[cfg(feature = "tracing")]
use tracing::instrument;

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error("cannot list frames in {path}: {source}")]
    ListFrames {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no PNG or JPEG frames found in {0}")]
    NoFrames(PathBuf),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("unusable frame {path}: {source}")]
    Frame {
        path: PathBuf,
        #[source]
        source: FrameError,
    },

    #[error("cannot read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write mask {path}: {source}")]
    MaskWrite {
        path: PathBuf,
        #[source]
        source: MaskWriteError,
    },
}

/// Failure while writing a diff mask image.
#[derive(thiserror::Error, Debug)]
pub enum MaskWriteError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Replay configuration, usually loaded from JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub params: RacerParams,
    /// Explicit lane corners (`[x, y]` in pixels of the first frame). Halves
    /// of the frame when absent.
    pub lanes: Option<PerLane<[[f32; 2]; 4]>>,
    /// Zero-based frame index at which the race is started. `None` only
    /// scores motion.
    pub start_at: Option<usize>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            params: RacerParams::default(),
            lanes: None,
            start_at: Some(0),
        }
    }
}

impl ReplayConfig {
    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let text = fs::read_to_string(path).map_err(|source| ReplayError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ReplayError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Racer for frames of the given size.
    pub fn build_racer(&self, width: usize, height: usize) -> ThreshRacer {
        let lanes = match &self.lanes {
            Some(corners) => LaneSet::from_corners(
                width,
                height,
                corners.map(|quad| quad.map(|[x, y]| Point2::new(x, y))),
            ),
            None => LaneSet::split_halves(width, height),
        };
        ThreshRacer::with_lanes(lanes, self.params.clone())
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReplayOptions {
    /// Keep feeding frames after the race has finished.
    pub keep_going: bool,
    /// Write the diff mask of every scored tick here as `mask_NNNNN.png`.
    pub mask_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default)]
pub struct ReplaySummary {
    pub frames_read: usize,
    pub scored_ticks: usize,
    /// State after the last processed frame.
    pub final_state: Option<DisplayState>,
}

/// Image files in `dir`, sorted by file name.
pub fn collect_frame_paths(dir: &Path) -> Result<Vec<PathBuf>, ReplayError> {
    let list_err = |source| ReplayError::ListFrames {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        let is_frame = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                FRAME_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            });
        if is_frame && path.is_file() {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(ReplayError::NoFrames(dir.to_path_buf()));
    }
    paths.sort();
    Ok(paths)
}

/// Feed `paths` through one racer, calling `on_tick` after every frame.
///
/// Stops after the tick that finishes the race unless
/// [`ReplayOptions::keep_going`] is set.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(frames = paths.len()))
)]
pub fn replay_frames<F>(
    paths: &[PathBuf],
    config: &ReplayConfig,
    options: &ReplayOptions,
    mut on_tick: F,
) -> Result<ReplaySummary, ReplayError>
where
    F: FnMut(&Path, TickOutcome, &DisplayState),
{
    if let Some(dir) = &options.mask_dir {
        fs::create_dir_all(dir).map_err(|source| ReplayError::MaskWrite {
            path: dir.clone(),
            source: source.into(),
        })?;
    }

    let mut racer: Option<ThreshRacer> = None;
    let mut summary = ReplaySummary::default();

    for (index, path) in paths.iter().enumerate() {
        let img = load_rgb(path)?;
        let view = rgb_view(&img).map_err(|source| ReplayError::Frame {
            path: path.clone(),
            source,
        })?;

        let racer = racer.get_or_insert_with(|| {
            let mut racer = config.build_racer(view.width(), view.height());
            racer.set_mask_enabled(options.mask_dir.is_some());
            racer
        });

        if config.start_at == Some(index) {
            racer.start_race();
        }

        let outcome = racer.tick(view);
        summary.frames_read += 1;

        let mut finished = false;
        if let TickOutcome::Scored { race_finished, .. } = outcome {
            summary.scored_ticks += 1;
            finished = race_finished;
            if let (Some(dir), Some(mask)) = (&options.mask_dir, racer.diff_mask()) {
                let mask_path = dir.join(format!("mask_{index:05}.png"));
                to_rgb_image(mask)
                    .save(&mask_path)
                    .map_err(|source| ReplayError::MaskWrite {
                        path: mask_path.clone(),
                        source: source.into(),
                    })?;
            }
        }

        let state = racer.display_state();
        on_tick(path.as_path(), outcome, &state);
        summary.final_state = Some(state);

        if finished && !options.keep_going {
            info!(
                "race finished at frame {} of {}; stopping",
                index + 1,
                paths.len()
            );
            break;
        }
    }

    if let Some(start) = config.start_at {
        if start >= paths.len() {
            warn!(
                "race start frame {start} is past the last frame ({}); race never ran",
                paths.len()
            );
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_start_immediately() {
        let config: ReplayConfig = serde_json::from_str("{}").expect("empty config");
        assert_eq!(config, ReplayConfig::default());
        assert_eq!(config.start_at, Some(0));
    }

    #[test]
    fn config_with_lanes_builds_custom_layout() {
        let json = r#"{
            "params": { "threshold": 5.0 },
            "lanes": {
                "left":  [[0, 0], [10, 0], [10, 10], [0, 10]],
                "right": [[10, 0], [40, 0], [40, 10], [10, 10]]
            },
            "start_at": null
        }"#;
        let config: ReplayConfig = serde_json::from_str(json).expect("config");
        assert_eq!(config.start_at, None);

        let racer = config.build_racer(40, 10);
        assert_eq!(racer.params().threshold, 5.0);
        let areas = racer.lanes().areas();
        assert_eq!(areas, PerLane::new(100.0, 300.0));
    }

    #[test]
    fn empty_directory_has_no_frames() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("notes.txt"), "not a frame").expect("write");
        assert!(matches!(
            collect_frame_paths(dir.path()),
            Err(ReplayError::NoFrames(_))
        ));
    }

    #[test]
    fn frames_are_sorted_by_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["b.png", "a.PNG", "c.jpg", "skip.bmp"] {
            fs::write(dir.path().join(name), b"").expect("write");
        }
        let names: Vec<String> = collect_frame_paths(dir.path())
            .expect("frames")
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_owned))
            .collect();
        assert_eq!(names, ["a.PNG", "b.png", "c.jpg"]);
    }
}
