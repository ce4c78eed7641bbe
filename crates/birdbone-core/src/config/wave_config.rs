use serde::{Deserialize, Serialize};

use super::defaults;

/// Wave scheduler configuration. Fractions refer to the whole unit population.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Maximum fraction removable in one wave, in (0, 1].
    pub per_wave_cap: f64,
    /// Fraction of the first wave.
    pub initial_wave_fraction: f64,
    /// Smallest wave worth running; below it the scheduler terminates.
    pub min_wave_fraction: f64,
    /// Overall compression target, in (0, 1].
    pub total_budget: f64,
    /// Consecutive commits required before the pace grows.
    pub stability_window: usize,
    /// Pace multiplier after a stable window.
    pub growth_factor: f64,
    /// Pace multiplier after a rollback, in (0, 1).
    pub backoff_factor: f64,
    /// Trailing rollbacks that end the run.
    pub max_consecutive_rollbacks: usize,
    /// Hard bound on cycles per run.
    pub max_cycles: u64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            per_wave_cap: defaults::DEFAULT_PER_WAVE_CAP,
            initial_wave_fraction: defaults::DEFAULT_INITIAL_WAVE_FRACTION,
            min_wave_fraction: defaults::DEFAULT_MIN_WAVE_FRACTION,
            total_budget: defaults::DEFAULT_TOTAL_BUDGET,
            stability_window: defaults::DEFAULT_STABILITY_WINDOW,
            growth_factor: defaults::DEFAULT_GROWTH_FACTOR,
            backoff_factor: defaults::DEFAULT_BACKOFF_FACTOR,
            max_consecutive_rollbacks: defaults::DEFAULT_MAX_CONSECUTIVE_ROLLBACKS,
            max_cycles: defaults::DEFAULT_MAX_CYCLES,
        }
    }
}
