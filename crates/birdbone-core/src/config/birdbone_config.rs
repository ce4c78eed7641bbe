//! Top-level birdbone configuration with layered resolution.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{
    EngineConfig, GuardrailConfig, HealingConfig, ObservabilityConfig, ScoringConfig,
    StorageConfig, WaveConfig,
};
use crate::constants::{ENV_PREFIX, PROJECT_CONFIG_FILE};
use crate::errors::ConfigError;
use crate::models::ScoringMode;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`BIRDBONE_*`)
/// 2. Project config (`birdbone.toml` in the working root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BirdboneConfig {
    pub scoring: ScoringConfig,
    pub waves: WaveConfig,
    pub healing: HealingConfig,
    pub guardrail: GuardrailConfig,
    pub engine: EngineConfig,
    pub storage: StorageConfig,
    pub observability: ObservabilityConfig,
}

impl BirdboneConfig {
    /// Load configuration with layered resolution and validate the result.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        let mut config = if project_config_path.exists() {
            Self::from_file(&project_config_path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Apply `BIRDBONE_*` overrides read through `lookup`.
    /// Unparseable values are errors, never ignored.
    pub fn apply_env_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        if let Some(v) = var("SCORING_MODE") {
            self.scoring.mode = ScoringMode::from_str(&v).map_err(|message| {
                ConfigError::InvalidValue {
                    field: "scoring.mode".to_string(),
                    message,
                }
            })?;
        }
        if let Some(v) = var("PER_WAVE_CAP") {
            self.waves.per_wave_cap = parse_env("waves.per_wave_cap", &v)?;
        }
        if let Some(v) = var("TOTAL_BUDGET") {
            self.waves.total_budget = parse_env("waves.total_budget", &v)?;
        }
        if let Some(v) = var("STABILITY_WINDOW") {
            self.waves.stability_window = parse_env("waves.stability_window", &v)?;
        }
        if let Some(v) = var("ROLLBACK_TOLERANCE") {
            self.guardrail.rollback_tolerance = parse_env("guardrail.rollback_tolerance", &v)?;
        }
        if let Some(v) = var("HEALING_STEP_BUDGET") {
            self.healing.step_budget = parse_env("healing.step_budget", &v)?;
        }
        if let Some(v) = var("DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = var("LOG_LEVEL") {
            self.observability.log_level = v;
        }
        Ok(())
    }

    /// Validate every value. Nothing is clamped: out-of-range settings fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let w = &self.waves;
        unit_interval("waves.per_wave_cap", w.per_wave_cap)?;
        unit_interval("waves.total_budget", w.total_budget)?;
        unit_interval("waves.initial_wave_fraction", w.initial_wave_fraction)?;
        unit_interval("waves.min_wave_fraction", w.min_wave_fraction)?;
        if w.initial_wave_fraction > w.per_wave_cap {
            return Err(ConfigError::validation(
                "waves.initial_wave_fraction",
                format!(
                    "{} exceeds per_wave_cap {}",
                    w.initial_wave_fraction, w.per_wave_cap
                ),
            ));
        }
        if w.min_wave_fraction > w.initial_wave_fraction {
            return Err(ConfigError::validation(
                "waves.min_wave_fraction",
                format!(
                    "{} exceeds initial_wave_fraction {}",
                    w.min_wave_fraction, w.initial_wave_fraction
                ),
            ));
        }
        if w.stability_window == 0 {
            return Err(ConfigError::validation(
                "waves.stability_window",
                "must be at least 1",
            ));
        }
        if !(w.growth_factor.is_finite() && w.growth_factor > 1.0) {
            return Err(ConfigError::validation(
                "waves.growth_factor",
                "must be greater than 1.0",
            ));
        }
        if !(w.backoff_factor > 0.0 && w.backoff_factor < 1.0) {
            return Err(ConfigError::validation(
                "waves.backoff_factor",
                "must be in (0.0, 1.0)",
            ));
        }
        if w.max_consecutive_rollbacks == 0 {
            return Err(ConfigError::validation(
                "waves.max_consecutive_rollbacks",
                "must be at least 1",
            ));
        }
        if w.max_cycles == 0 {
            return Err(ConfigError::validation(
                "waves.max_cycles",
                "must be at least 1",
            ));
        }

        let h = &self.healing;
        if h.step_budget == 0 {
            return Err(ConfigError::validation(
                "healing.step_budget",
                "must be at least 1",
            ));
        }
        if h.convergence_window < 2 {
            return Err(ConfigError::validation(
                "healing.convergence_window",
                "must be at least 2",
            ));
        }
        if !(h.convergence_epsilon.is_finite() && h.convergence_epsilon >= 0.0) {
            return Err(ConfigError::validation(
                "healing.convergence_epsilon",
                "must be a non-negative number",
            ));
        }
        let (peak, floor) = (h.learning_rate.peak(), h.learning_rate.floor());
        if !(peak.is_finite() && floor.is_finite() && floor >= 0.0 && peak > 0.0) {
            return Err(ConfigError::validation(
                "healing.learning_rate",
                "rates must be finite, non-negative, and not all zero",
            ));
        }

        let g = &self.guardrail;
        if g.metric.trim().is_empty() {
            return Err(ConfigError::validation(
                "guardrail.metric",
                "must not be empty",
            ));
        }
        if !(g.rollback_tolerance.is_finite() && g.rollback_tolerance >= 0.0) {
            return Err(ConfigError::validation(
                "guardrail.rollback_tolerance",
                "must be a non-negative number",
            ));
        }
        if let Some(c) = g.cumulative_tolerance {
            if !(c.is_finite() && c >= 0.0) {
                return Err(ConfigError::validation(
                    "guardrail.cumulative_tolerance",
                    "must be a non-negative number",
                ));
            }
        }

        if self.scoring.mode.needs_calibration() && self.scoring.max_calibration_batches == 0 {
            return Err(ConfigError::validation(
                "scoring.max_calibration_batches",
                "must be at least 1 for gradient and curvature scoring",
            ));
        }
        Ok(())
    }
}

fn unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::validation(
            field,
            format!("{value} is outside (0.0, 1.0]"),
        ))
    }
}

fn parse_env<T: FromStr>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("'{raw}': {e}"),
    })
}
