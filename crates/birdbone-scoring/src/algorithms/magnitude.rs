//! Magnitude salience: the norm of a unit's parameters.

use birdbone_core::config::MagnitudeNorm;
use birdbone_core::models::StructuralUnit;

/// Raw magnitude score. Accumulates in f64 so long units don't lose precision.
pub fn score(unit: &StructuralUnit, norm: MagnitudeNorm) -> f64 {
    match norm {
        MagnitudeNorm::L1 => unit.values.iter().map(|&v| (v as f64).abs()).sum(),
        MagnitudeNorm::L2 => unit
            .values
            .iter()
            .map(|&v| {
                let v = v as f64;
                v * v
            })
            .sum::<f64>()
            .sqrt(),
    }
}
