//! Learning-rate schedules for healing passes.

use serde::{Deserialize, Serialize};

/// Learning rate as a function of the healing step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LearningRateSchedule {
    Constant { rate: f64 },
    /// Linear interpolation from `initial` at step 0 to `final_rate` at the last step.
    LinearDecay { initial: f64, final_rate: f64 },
    /// Half-cosine from `initial` down to `min_rate`.
    Cosine { initial: f64, min_rate: f64 },
}

impl Default for LearningRateSchedule {
    fn default() -> Self {
        Self::Constant { rate: 1e-4 }
    }
}

impl LearningRateSchedule {
    /// Rate for `step` out of `budget` steps.
    pub fn rate_at(&self, step: usize, budget: usize) -> f64 {
        let progress = if budget > 1 {
            (step.min(budget - 1)) as f64 / (budget - 1) as f64
        } else {
            0.0
        };
        match *self {
            Self::Constant { rate } => rate,
            Self::LinearDecay {
                initial,
                final_rate,
            } => initial + (final_rate - initial) * progress,
            Self::Cosine { initial, min_rate } => {
                min_rate + 0.5 * (initial - min_rate) * (1.0 + (std::f64::consts::PI * progress).cos())
            }
        }
    }

    /// Largest rate the schedule can produce.
    pub fn peak(&self) -> f64 {
        match *self {
            Self::Constant { rate } => rate,
            Self::LinearDecay {
                initial,
                final_rate,
            } => initial.max(final_rate),
            Self::Cosine { initial, min_rate } => initial.max(min_rate),
        }
    }

    /// Smallest rate the schedule can produce.
    pub fn floor(&self) -> f64 {
        match *self {
            Self::Constant { rate } => rate,
            Self::LinearDecay {
                initial,
                final_rate,
            } => initial.min(final_rate),
            Self::Cosine { initial, min_rate } => initial.min(min_rate),
        }
    }
}
