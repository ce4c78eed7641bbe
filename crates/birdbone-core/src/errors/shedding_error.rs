use super::error_code::{self, BirdboneErrorCode};
use crate::models::{UnitId, WaveStatus};

/// Shedding engine errors. Apply failures are recoverable: the caller
/// re-scores and requests a fresh wave.
#[derive(Debug, thiserror::Error)]
pub enum SheddingError {
    #[error("unit {unit} referenced by wave {wave_id} is already removed")]
    StaleUnitReference { wave_id: String, unit: UnitId },

    #[error("unit {unit} referenced by wave {wave_id} does not exist")]
    UnknownUnit { wave_id: String, unit: UnitId },

    #[error("applying wave {wave_id} failed: {reason}")]
    ApplyFailed { wave_id: String, reason: String },

    #[error("restoring wave {wave_id} failed: {reason}")]
    RestoreFailed { wave_id: String, reason: String },

    #[error("wave {wave_id} cannot move from {from:?} to {to:?}")]
    InvalidTransition {
        wave_id: String,
        from: WaveStatus,
        to: WaveStatus,
    },

    #[error("wave {wave_id} is {actual:?}, expected {expected:?}")]
    InvalidWaveStatus {
        wave_id: String,
        expected: WaveStatus,
        actual: WaveStatus,
    },
}

impl BirdboneErrorCode for SheddingError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::StaleUnitReference { .. } => error_code::STALE_UNIT_REFERENCE,
            Self::ApplyFailed { .. } => error_code::APPLY_FAILED,
            _ => error_code::SHEDDING_ERROR,
        }
    }
}
