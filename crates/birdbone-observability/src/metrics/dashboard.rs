//! Surface wave outcomes through observability.

use serde::Serialize;

use birdbone_core::models::{OutcomeKind, ReasonCode, WaveOutcome};

/// Snapshot of compression progress for observability.
#[derive(Debug, Clone, Serialize)]
pub struct CompressionDashboard {
    /// Waves that reached commit or rollback.
    pub total_waves: usize,
    pub commits: usize,
    /// Rollbacks decided by the guardrail threshold.
    pub threshold_rollbacks: usize,
    /// Rollbacks forced by divergence, failure, timeout, or cancellation.
    pub forced_rollbacks: usize,
    /// Commits over total waves (0.0 to 1.0).
    pub success_rate: f64,
    /// Fraction of the population removed after the latest wave.
    pub removed_fraction: f64,
    /// Quality baseline after each resolved wave, by cycle.
    pub baseline_trajectory: Vec<(u64, f64)>,
    /// Latest outcome of any kind.
    pub latest_outcome: Option<WaveOutcome>,
    /// Set once the engine has stopped.
    pub termination: Option<ReasonCode>,
}

impl CompressionDashboard {
    pub fn new() -> Self {
        Self {
            total_waves: 0,
            commits: 0,
            threshold_rollbacks: 0,
            forced_rollbacks: 0,
            success_rate: 0.0,
            removed_fraction: 0.0,
            baseline_trajectory: Vec::new(),
            latest_outcome: None,
            termination: None,
        }
    }

    /// Record one cycle's outcome together with the model state after it.
    pub fn record_outcome(&mut self, outcome: &WaveOutcome, removed_fraction: f64, baseline: f64) {
        match outcome.kind {
            OutcomeKind::Committed => {
                self.total_waves += 1;
                self.commits += 1;
            }
            OutcomeKind::RolledBack => {
                self.total_waves += 1;
                if outcome.forced() {
                    self.forced_rollbacks += 1;
                } else {
                    self.threshold_rollbacks += 1;
                }
            }
            OutcomeKind::Terminal => self.termination = Some(outcome.reason),
        }
        self.success_rate = if self.total_waves > 0 {
            self.commits as f64 / self.total_waves as f64
        } else {
            0.0
        };
        self.removed_fraction = removed_fraction;
        if outcome.kind != OutcomeKind::Terminal {
            self.baseline_trajectory.push((outcome.cycle, baseline));
        }
        self.latest_outcome = Some(outcome.clone());
    }

    /// Rollbacks of either kind.
    pub fn rollbacks(&self) -> usize {
        self.threshold_rollbacks + self.forced_rollbacks
    }
}

impl Default for CompressionDashboard {
    fn default() -> Self {
        Self::new()
    }
}
