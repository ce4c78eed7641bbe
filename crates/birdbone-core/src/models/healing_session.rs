//! Bounded reinforcement run tied to one wave.

use serde::{Deserialize, Serialize};

use super::guardrail::GuardrailVerdict;
use super::lr_schedule::LearningRateSchedule;
use super::unit::UnitId;

/// Which parameters a healing step may update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealingScopeMode {
    /// Active units in the layers the wave touched.
    WaveLayers,
    /// Every active unit.
    WholeModel,
}

/// Resolved healing scope for one wave.
#[derive(Debug, Clone, PartialEq)]
pub struct HealingScope {
    pub mode: HealingScopeMode,
    /// Layers the wave removed units from.
    pub layers: Vec<String>,
    /// Active units a step is allowed to update.
    pub unit_ids: Vec<UnitId>,
}

/// Why the healing loop stopped stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealingStop {
    /// The last `convergence_window` losses stayed within epsilon.
    Converged,
    /// Ran every step of the budget.
    StepBudgetExhausted,
    Diverged,
    StepFailed,
    Cancelled,
    TimedOut,
}

impl HealingStop {
    /// Stops that skip evaluation and roll back immediately.
    pub fn is_abort(&self) -> bool {
        !matches!(self, Self::Converged | Self::StepBudgetExhausted)
    }
}

/// Terminal state of a healing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionTerminal {
    ConvergedAccepted,
    ConvergedRejected,
    /// Ran the whole step budget without stabilizing.
    BudgetExhausted,
    /// Stopped by divergence, step failure, cancellation, or timeout.
    Aborted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealingSession {
    pub wave_id: String,
    pub step_budget: usize,
    pub schedule: LearningRateSchedule,
    /// Guardrail baseline before the wave was applied.
    pub pre_quality: f64,
    pub post_quality: Option<f64>,
    /// Loss reported by each completed step.
    pub losses: Vec<f64>,
    pub stop: Option<HealingStop>,
    pub verdict: Option<GuardrailVerdict>,
    pub elapsed_ms: u64,
}

impl HealingSession {
    pub fn new(
        wave_id: impl Into<String>,
        step_budget: usize,
        schedule: LearningRateSchedule,
        pre_quality: f64,
    ) -> Self {
        Self {
            wave_id: wave_id.into(),
            step_budget,
            schedule,
            pre_quality,
            post_quality: None,
            losses: Vec::new(),
            stop: None,
            verdict: None,
            elapsed_ms: 0,
        }
    }

    pub fn steps_taken(&self) -> usize {
        self.losses.len()
    }

    /// True once the trailing `window` losses lie within `epsilon` of each other.
    pub fn has_stabilized(&self, window: usize, epsilon: f64) -> bool {
        if window == 0 || self.losses.len() < window {
            return false;
        }
        let tail = &self.losses[self.losses.len() - window..];
        let (lo, hi) = tail
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &l| {
                (lo.min(l), hi.max(l))
            });
        hi - lo <= epsilon
    }

    pub fn terminal(&self) -> Option<SessionTerminal> {
        match self.stop? {
            HealingStop::Converged => self.verdict.map(|v| {
                if v.is_accept() {
                    SessionTerminal::ConvergedAccepted
                } else {
                    SessionTerminal::ConvergedRejected
                }
            }),
            HealingStop::StepBudgetExhausted => Some(SessionTerminal::BudgetExhausted),
            _ => Some(SessionTerminal::Aborted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stabilizes_on_three_close_losses() {
        let mut s = HealingSession::new("w", 10, LearningRateSchedule::default(), 1.0);
        s.losses = vec![2.0, 1.5, 1.20, 1.2001, 1.2002];
        assert!(s.has_stabilized(3, 1e-3));
        assert!(!s.has_stabilized(4, 1e-3));
    }

    #[test]
    fn terminal_state_follows_stop_and_verdict() {
        let mut s = HealingSession::new("w", 10, LearningRateSchedule::default(), 1.0);
        assert_eq!(s.terminal(), None);
        s.stop = Some(HealingStop::Converged);
        s.verdict = Some(GuardrailVerdict::Accept { degradation: 0.0 });
        assert_eq!(s.terminal(), Some(SessionTerminal::ConvergedAccepted));
        s.stop = Some(HealingStop::StepBudgetExhausted);
        assert_eq!(s.terminal(), Some(SessionTerminal::BudgetExhausted));
        s.stop = Some(HealingStop::Cancelled);
        assert_eq!(s.terminal(), Some(SessionTerminal::Aborted));
    }
}
