//! Per-unit raw salience functions. Each returns a non-negative raw score;
//! normalization happens when the importance record is built.

pub mod curvature;
pub mod gradient;
pub mod magnitude;

use birdbone_core::errors::ScoringError;
use birdbone_core::models::StructuralUnit;

/// Gradients must line up one-to-one with the unit's values.
pub(crate) fn check_shape(unit: &StructuralUnit, grads: &[f32]) -> Result<(), ScoringError> {
    if grads.len() != unit.values.len() {
        return Err(ScoringError::ShapeMismatch {
            unit: unit.id,
            expected: unit.values.len(),
            actual: grads.len(),
        });
    }
    Ok(())
}
