//! Pacing state derived from wave outcomes.

use serde::{Deserialize, Serialize};

use birdbone_core::config::WaveConfig;
use birdbone_core::models::{OutcomeKind, WaveOutcome};

/// Direction of a pacing change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingChange {
    /// A full stability window committed.
    Grow,
    /// A wave rolled back.
    Backoff,
}

impl PacingChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grow => "grow",
            Self::Backoff => "backoff",
        }
    }
}

/// One change of the removal fraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingAdjustment {
    pub cycle: u64,
    pub change: PacingChange,
    pub old_fraction: f64,
    pub new_fraction: f64,
}

/// Removal pace after some prefix of the history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PacingState {
    /// Fraction of the population the next wave aims to remove.
    pub fraction: f64,
    /// Commits since the last growth step or rollback.
    pub commit_streak: usize,
    /// Rollbacks since the last commit.
    pub consecutive_rollbacks: usize,
}

impl PacingState {
    pub fn initial(config: &WaveConfig) -> Self {
        Self {
            fraction: config.initial_wave_fraction.min(config.per_wave_cap),
            commit_streak: 0,
            consecutive_rollbacks: 0,
        }
    }

    /// Replay `history` from the initial pace.
    pub fn replay(config: &WaveConfig, history: &[WaveOutcome]) -> Self {
        let mut state = Self::initial(config);
        for outcome in history {
            state.observe(config, outcome);
        }
        state
    }

    /// Fold one outcome into the pace. Terminal outcomes change nothing.
    pub fn observe(&mut self, config: &WaveConfig, outcome: &WaveOutcome) -> Option<PacingAdjustment> {
        let old_fraction = self.fraction;
        match outcome.kind {
            OutcomeKind::Committed => {
                self.consecutive_rollbacks = 0;
                self.commit_streak += 1;
                if self.commit_streak < config.stability_window {
                    return None;
                }
                self.commit_streak = 0;
                self.fraction = (self.fraction * config.growth_factor).min(config.per_wave_cap);
                (self.fraction != old_fraction).then_some(PacingAdjustment {
                    cycle: outcome.cycle,
                    change: PacingChange::Grow,
                    old_fraction,
                    new_fraction: self.fraction,
                })
            }
            OutcomeKind::RolledBack => {
                self.commit_streak = 0;
                self.consecutive_rollbacks += 1;
                // Back off from what the failing wave actually removed.
                let failed = if outcome.removal_fraction > 0.0 {
                    outcome.removal_fraction
                } else {
                    self.fraction
                };
                self.fraction = (failed * config.backoff_factor).max(config.min_wave_fraction);
                Some(PacingAdjustment {
                    cycle: outcome.cycle,
                    change: PacingChange::Backoff,
                    old_fraction,
                    new_fraction: self.fraction,
                })
            }
            OutcomeKind::Terminal => None,
        }
    }
}
