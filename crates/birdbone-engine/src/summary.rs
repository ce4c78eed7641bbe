//! Result of one `CompressionEngine::run`.

use serde::Serialize;

use birdbone_core::models::{OutcomeKind, ReasonCode, WaveOutcome};

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Outcomes produced by this run, in cycle order.
    pub outcomes: Vec<WaveOutcome>,
    /// Why the loop stopped.
    pub stop_reason: ReasonCode,
    /// Fraction of the population removed when the loop stopped.
    pub removed_fraction: f64,
    /// Guardrail baseline when the loop stopped.
    pub baseline: f64,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn commits(&self) -> usize {
        self.count(OutcomeKind::Committed)
    }

    pub fn rollbacks(&self) -> usize {
        self.count(OutcomeKind::RolledBack)
    }

    fn count(&self, kind: OutcomeKind) -> usize {
        self.outcomes.iter().filter(|o| o.kind == kind).count()
    }
}
