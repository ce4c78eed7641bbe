use serde::{Deserialize, Serialize};

use super::defaults;
use crate::models::MetricDirection;

/// Quality guardrail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardrailConfig {
    /// Metric name passed to the evaluator.
    pub metric: String,
    pub direction: MetricDirection,
    /// Maximum relative degradation per wave.
    pub rollback_tolerance: f64,
    /// Maximum relative degradation against the pre-compression baseline.
    pub cumulative_tolerance: Option<f64>,
}

impl Default for GuardrailConfig {
    fn default() -> Self {
        Self {
            metric: defaults::DEFAULT_METRIC.to_string(),
            direction: MetricDirection::LowerIsBetter,
            rollback_tolerance: defaults::DEFAULT_ROLLBACK_TOLERANCE,
            cumulative_tolerance: None,
        }
    }
}
