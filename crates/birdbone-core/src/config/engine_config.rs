use serde::{Deserialize, Serialize};

use super::defaults;

/// Outer-loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Re-score and re-schedule attempts after a recoverable shedding error.
    pub max_apply_retries: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_apply_retries: defaults::DEFAULT_MAX_APPLY_RETRIES,
        }
    }
}
