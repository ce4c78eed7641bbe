use super::error_code::{self, BirdboneErrorCode};
use crate::models::UnitId;

/// Errors raised by injected collaborators (model access, evaluator,
/// reinforcer, calibration source).
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model access failed: {reason}")]
    Access { reason: String },

    #[error("unit {unit} is not present in the model")]
    MissingUnit { unit: UnitId },

    #[error("unit {unit} is already masked")]
    AlreadyMasked { unit: UnitId },

    #[error("duplicate unit id {unit}")]
    DuplicateUnit { unit: UnitId },
}

impl BirdboneErrorCode for ModelError {
    fn error_code(&self) -> &'static str {
        error_code::MODEL_ERROR
    }
}
