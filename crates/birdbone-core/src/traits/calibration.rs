use crate::errors::BirdboneResult;
use crate::models::StructuralUnit;

/// Small calibration batch used by gradient and curvature scoring.
pub trait CalibrationSource: Send + Sync {
    /// Number of batches available.
    fn batch_count(&self) -> usize;

    /// Loss gradient with respect to each value of `unit` on `batch`.
    /// Must have the same length as `unit.values`.
    fn gradients(&self, batch: usize, unit: &StructuralUnit) -> BirdboneResult<Vec<f32>>;
}
