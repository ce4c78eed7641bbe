//! Per-cycle outcomes and reason codes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a cycle ended the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// Post-healing quality within tolerance.
    WithinTolerance,
    /// Relative degradation above the rollback tolerance.
    ThresholdExceeded,
    /// Degradation against the first baseline above the cumulative tolerance.
    CumulativeDriftExceeded,
    /// NaN or infinite loss/metric during healing.
    NumericalDivergence,
    /// A reinforcement step returned an error.
    HealingFailed,
    /// The evaluator returned an error.
    EvaluationFailed,
    /// The wave-level healing timeout elapsed.
    HealingTimeout,
    /// The caller's cancellation signal was observed.
    Cancelled,
    BudgetExhausted,
    NoActiveUnits,
    /// Too many trailing rollbacks at minimum pace.
    RollbackLimit,
    /// The configured maximum number of cycles ran.
    CycleLimit,
}

impl ReasonCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WithinTolerance => "within_tolerance",
            Self::ThresholdExceeded => "threshold_exceeded",
            Self::CumulativeDriftExceeded => "cumulative_drift_exceeded",
            Self::NumericalDivergence => "numerical_divergence",
            Self::HealingFailed => "healing_failed",
            Self::EvaluationFailed => "evaluation_failed",
            Self::HealingTimeout => "healing_timeout",
            Self::Cancelled => "cancelled",
            Self::BudgetExhausted => "budget_exhausted",
            Self::NoActiveUnits => "no_active_units",
            Self::RollbackLimit => "rollback_limit",
            Self::CycleLimit => "cycle_limit",
        }
    }

    /// Rollbacks that happened regardless of the quality threshold.
    pub fn is_forced_rollback(&self) -> bool {
        matches!(
            self,
            Self::NumericalDivergence
                | Self::HealingFailed
                | Self::EvaluationFailed
                | Self::HealingTimeout
                | Self::Cancelled
        )
    }

    pub fn parse(s: &str) -> Option<Self> {
        let all = [
            Self::WithinTolerance,
            Self::ThresholdExceeded,
            Self::CumulativeDriftExceeded,
            Self::NumericalDivergence,
            Self::HealingFailed,
            Self::EvaluationFailed,
            Self::HealingTimeout,
            Self::Cancelled,
            Self::BudgetExhausted,
            Self::NoActiveUnits,
            Self::RollbackLimit,
            Self::CycleLimit,
        ];
        all.into_iter().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured result of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Committed,
    RolledBack,
    Terminal,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
            Self::Terminal => "terminal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "committed" => Some(Self::Committed),
            "rolled_back" => Some(Self::RolledBack),
            "terminal" => Some(Self::Terminal),
            _ => None,
        }
    }
}

/// Entry of the scheduler's stability history and the persisted outcome log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveOutcome {
    pub cycle: u64,
    pub wave_id: Option<String>,
    pub kind: OutcomeKind,
    pub reason: ReasonCode,
    pub target_fraction: f64,
    /// Fraction of the whole population removed by the wave.
    pub removal_fraction: f64,
    pub units_removed: usize,
    pub quality_before: Option<f64>,
    pub quality_after: Option<f64>,
    pub healing_steps: usize,
    pub recorded_at: DateTime<Utc>,
}

impl WaveOutcome {
    pub fn terminal(cycle: u64, reason: ReasonCode) -> Self {
        Self {
            cycle,
            wave_id: None,
            kind: OutcomeKind::Terminal,
            reason,
            target_fraction: 0.0,
            removal_fraction: 0.0,
            units_removed: 0,
            quality_before: None,
            quality_after: None,
            healing_steps: 0,
            recorded_at: Utc::now(),
        }
    }

    pub fn is_committed(&self) -> bool {
        self.kind == OutcomeKind::Committed
    }

    pub fn is_rolled_back(&self) -> bool {
        self.kind == OutcomeKind::RolledBack
    }

    pub fn is_terminal(&self) -> bool {
        self.kind == OutcomeKind::Terminal
    }

    /// Rolled back for a reason other than the quality threshold.
    pub fn forced(&self) -> bool {
        self.is_rolled_back() && self.reason.is_forced_rollback()
    }
}
