use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::ScoringMode;

/// Norm used by magnitude scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MagnitudeNorm {
    L1,
    L2,
}

/// Importance scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Salience metric: magnitude, gradient, or curvature.
    pub mode: ScoringMode,
    /// Norm for magnitude scoring.
    pub magnitude_norm: MagnitudeNorm,
    /// Upper bound on calibration batches per scoring pass.
    pub max_calibration_batches: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mode: ScoringMode::Magnitude,
            magnitude_norm: MagnitudeNorm::L2,
            max_calibration_batches: defaults::DEFAULT_MAX_CALIBRATION_BATCHES,
        }
    }
}
