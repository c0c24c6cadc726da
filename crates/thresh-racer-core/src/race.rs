//! Progress race between the two lanes.
//!
//! Only `active`, the progress pair and the captured gains are stored. The
//! finished outcome is always derived from them by [`RaceStatus::classify`].

use std::fmt;

use log::info;
use serde::{Deserialize, Serialize};

use crate::lanes::{LaneId, PerLane};

/// Finished progress values closer than this are a tie.
pub const FINISH_TIE_EPSILON: f32 = 0.001;

/// Progress as a whole percentage, truncated and clamped to `[0, 100]`.
#[inline]
pub fn percent(progress: f32) -> u32 {
    (progress * 100.0).clamp(0.0, 100.0) as u32
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Race {
    active: bool,
    progress: PerLane<f32>,
    gains: PerLane<f32>,
}

impl Race {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new race from zero with `gains` fixed for its duration.
    pub fn start(&mut self, gains: PerLane<f32>) {
        self.active = true;
        self.progress = PerLane::splat(0.0);
        self.gains = gains;
        info!(
            "race started (gain L {:.2}, gain R {:.2})",
            gains.left, gains.right
        );
    }

    /// Add one tick of normalised motion.
    ///
    /// Both lanes advance before the finish check. Returns `true` on the tick
    /// the race finishes; does nothing when inactive.
    pub fn advance(&mut self, normalized: PerLane<f32>) -> bool {
        if !self.active {
            return false;
        }

        for lane in LaneId::ALL {
            let step = normalized[lane] * self.gains[lane];
            self.progress[lane] = (self.progress[lane] + step).clamp(0.0, 1.0);
        }

        if self.progress.left >= 1.0 || self.progress.right >= 1.0 {
            self.active = false;
            info!("race over: {}", self.status());
            return true;
        }
        false
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn progress(&self) -> PerLane<f32> {
        self.progress
    }

    /// Gains captured by the last [`Race::start`].
    pub fn gains(&self) -> PerLane<f32> {
        self.gains
    }

    pub fn status(&self) -> RaceStatus {
        RaceStatus::classify(self.active, self.progress)
    }
}

/// What the race display should say.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RaceStatus {
    Idle,
    Running {
        left_percent: u32,
        right_percent: u32,
    },
    Won {
        winner: LaneId,
        winner_percent: u32,
        loser_percent: u32,
    },
    /// Race stopped with nobody at 100%.
    Leads {
        leader: LaneId,
        leader_percent: u32,
        trailer_percent: u32,
    },
    Tie {
        percent: u32,
    },
}

impl RaceStatus {
    pub fn classify(active: bool, progress: PerLane<f32>) -> Self {
        let (l, r) = (progress.left, progress.right);
        let (pl, pr) = (percent(l), percent(r));

        if active {
            return RaceStatus::Running {
                left_percent: pl,
                right_percent: pr,
            };
        }
        if l == 0.0 && r == 0.0 {
            return RaceStatus::Idle;
        }
        if l >= 1.0 && r >= 1.0 && (l - r).abs() < FINISH_TIE_EPSILON {
            return RaceStatus::Tie { percent: 100 };
        }
        if l >= 1.0 && l > r {
            return RaceStatus::Won {
                winner: LaneId::Left,
                winner_percent: pl,
                loser_percent: pr,
            };
        }
        if r >= 1.0 && r > l {
            return RaceStatus::Won {
                winner: LaneId::Right,
                winner_percent: pr,
                loser_percent: pl,
            };
        }
        if l > r {
            RaceStatus::Leads {
                leader: LaneId::Left,
                leader_percent: pl,
                trailer_percent: pr,
            }
        } else if r > l {
            RaceStatus::Leads {
                leader: LaneId::Right,
                leader_percent: pr,
                trailer_percent: pl,
            }
        } else {
            RaceStatus::Tie { percent: pl }
        }
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RaceStatus::Idle => write!(f, "Race idle"),
            RaceStatus::Running {
                left_percent,
                right_percent,
            } => write!(f, "Running: L {left_percent}%  R {right_percent}%"),
            RaceStatus::Won {
                winner,
                winner_percent,
                loser_percent,
            } => write!(
                f,
                "Finished: {winner} wins ({winner_percent}% vs {loser_percent}%)"
            ),
            RaceStatus::Leads {
                leader,
                leader_percent,
                trailer_percent,
            } => write!(
                f,
                "Finished: {leader} leads ({leader_percent}% vs {trailer_percent}%)"
            ),
            RaceStatus::Tie { percent } => write!(f, "Finished: Tie ({percent}%)"),
        }
    }
}
