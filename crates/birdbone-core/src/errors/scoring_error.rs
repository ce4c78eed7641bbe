use super::error_code::{self, BirdboneErrorCode};
use crate::models::{ScoringMode, UnitId};

/// Importance scoring errors.
#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    #[error("model has no active structural units to score")]
    EmptyModel,

    #[error("{mode} scoring requires calibration data: {reason}")]
    InsufficientData { mode: ScoringMode, reason: String },

    #[error("gradient for unit {unit} has {actual} entries, expected {expected}")]
    ShapeMismatch {
        unit: UnitId,
        expected: usize,
        actual: usize,
    },

    #[error("invalid raw importance {value} for unit {unit}")]
    InvalidScore { unit: UnitId, value: f64 },
}

impl BirdboneErrorCode for ScoringError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyModel => error_code::EMPTY_MODEL,
            Self::InsufficientData { .. } => error_code::INSUFFICIENT_DATA,
            _ => error_code::SCORING_ERROR,
        }
    }
}
