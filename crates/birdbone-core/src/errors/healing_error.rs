use super::error_code::{self, BirdboneErrorCode};

/// Healing and guardrail errors. Inside a wave these are absorbed into
/// a forced rollback; they only surface from calls made outside a wave.
#[derive(Debug, thiserror::Error)]
pub enum HealingError {
    #[error("numerical divergence at healing step {step}: loss {loss}")]
    Diverged { step: usize, loss: f64 },

    #[error("healing step {step} failed: {reason}")]
    StepFailed { step: usize, reason: String },

    #[error("evaluating {metric} failed: {reason}")]
    EvaluationFailed { metric: String, reason: String },

    #[error("invalid healing transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

impl BirdboneErrorCode for HealingError {
    fn error_code(&self) -> &'static str {
        error_code::HEALING_ERROR
    }
}
