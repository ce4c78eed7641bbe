//! Typed golden scenarios under `test-fixtures/golden/`.

use serde::Deserialize;

use birdbone_core::config::BirdboneConfig;
use birdbone_core::models::{OutcomeKind, ReasonCode, StructuralUnit};

use crate::builders::layered_units;

#[derive(Debug, Clone, Deserialize)]
pub struct UnitSpec {
    pub count: usize,
    pub layers: usize,
    pub width: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaveOverrides {
    pub per_wave_cap: f64,
    pub initial_wave_fraction: f64,
    pub total_budget: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpectedOutcome {
    pub kind: OutcomeKind,
    pub reason: ReasonCode,
    pub units_removed: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Expected {
    pub outcomes: Vec<ExpectedOutcome>,
    pub removed_ids: Vec<u64>,
    pub final_baseline: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoldenScenario {
    pub name: String,
    pub description: String,
    pub units: UnitSpec,
    pub waves: WaveOverrides,
    pub rollback_tolerance: f64,
    /// Evaluator responses: the baseline first, then one per wave.
    pub evaluations: Vec<f64>,
    /// Zero-based healing step at which the caller cancels.
    #[serde(default)]
    pub cancel_at_step: Option<usize>,
    pub expected: Expected,
}

impl GoldenScenario {
    pub fn load(name: &str) -> Self {
        crate::load_fixture(&format!("golden/{name}.json"))
    }

    pub fn units(&self) -> Vec<StructuralUnit> {
        layered_units(self.units.count, self.units.layers, self.units.width)
    }

    /// Default configuration with the scenario's overrides applied.
    pub fn config(&self) -> BirdboneConfig {
        let mut config = BirdboneConfig::default();
        config.waves.per_wave_cap = self.waves.per_wave_cap;
        config.waves.initial_wave_fraction = self.waves.initial_wave_fraction;
        config.waves.total_budget = self.waves.total_budget;
        config.guardrail.rollback_tolerance = self.rollback_tolerance;
        config.healing.step_budget = 5;
        config
    }
}
