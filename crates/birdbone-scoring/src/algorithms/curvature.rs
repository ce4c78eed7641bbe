//! Second-order saliency using the empirical Fisher diagonal as the
//! curvature estimate: `0.5 · Σ (w·g)²` per batch.

use birdbone_core::errors::ScoringError;
use birdbone_core::models::StructuralUnit;

use super::check_shape;

pub fn batch_score(unit: &StructuralUnit, grads: &[f32]) -> Result<f64, ScoringError> {
    check_shape(unit, grads)?;
    let sum: f64 = unit
        .values
        .iter()
        .zip(grads)
        .map(|(&w, &g)| {
            let wg = w as f64 * g as f64;
            wg * wg
        })
        .sum();
    Ok(0.5 * sum)
}
