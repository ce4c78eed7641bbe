use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::{HealingScopeMode, LearningRateSchedule};

/// Healing session configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealingConfig {
    /// Maximum reinforcement steps per wave.
    pub step_budget: usize,
    pub learning_rate: LearningRateSchedule,
    /// Parameters a step may update.
    pub scope: HealingScopeMode,
    /// Spread of trailing losses that counts as stabilized.
    pub convergence_epsilon: f64,
    /// Number of trailing losses compared for early exit.
    pub convergence_window: usize,
    /// Bound on total healing time per wave, in milliseconds.
    pub wave_timeout_ms: Option<u64>,
    /// Keep committed deltas for audit instead of discarding them.
    pub retain_deltas: bool,
}

impl HealingConfig {
    pub fn wave_timeout(&self) -> Option<Duration> {
        self.wave_timeout_ms.map(Duration::from_millis)
    }
}

impl Default for HealingConfig {
    fn default() -> Self {
        Self {
            step_budget: defaults::DEFAULT_HEALING_STEP_BUDGET,
            learning_rate: LearningRateSchedule::Constant {
                rate: defaults::DEFAULT_LEARNING_RATE,
            },
            scope: HealingScopeMode::WaveLayers,
            convergence_epsilon: defaults::DEFAULT_CONVERGENCE_EPSILON,
            convergence_window: defaults::DEFAULT_CONVERGENCE_WINDOW,
            wave_timeout_ms: None,
            retain_deltas: defaults::DEFAULT_RETAIN_DELTAS,
        }
    }
}
