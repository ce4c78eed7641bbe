//! First-order Taylor saliency: the estimated loss change from zeroing a
//! unit is `|Σ w·g|` on one batch.

use birdbone_core::errors::ScoringError;
use birdbone_core::models::StructuralUnit;

use super::check_shape;

/// Raw saliency of `unit` on one batch of gradients.
pub fn batch_score(unit: &StructuralUnit, grads: &[f32]) -> Result<f64, ScoringError> {
    check_shape(unit, grads)?;
    let dot: f64 = unit
        .values
        .iter()
        .zip(grads)
        .map(|(&w, &g)| w as f64 * g as f64)
        .sum();
    Ok(dot.abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_terms_cancel() {
        let unit = StructuralUnit::new(1, "l", vec![1.0, 1.0]);
        assert_eq!(batch_score(&unit, &[2.0, -2.0]).unwrap(), 0.0);
        assert_eq!(batch_score(&unit, &[-2.0, -1.0]).unwrap(), 3.0);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let unit = StructuralUnit::new(9, "l", vec![1.0, 1.0]);
        let err = batch_score(&unit, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            ScoringError::ShapeMismatch { expected: 2, actual: 1, .. }
        ));
    }
}
