//! Unit population builders.

use birdbone_core::models::StructuralUnit;

/// `n` units spread round-robin over `layers` layers. Unit `i` holds
/// `width` copies of `(i + 1) * 0.01`, so magnitude grows with the id and
/// the lowest ids are always the least important.
pub fn layered_units(n: usize, layers: usize, width: usize) -> Vec<StructuralUnit> {
    let layers = layers.max(1);
    (0..n)
        .map(|i| {
            StructuralUnit::new(
                i as u64,
                format!("blocks.{}.mlp", i % layers),
                vec![(i + 1) as f32 * 0.01; width],
            )
        })
        .collect()
}

/// Single-layer population with distinct magnitudes and mixed signs.
pub fn ramp_units(n: usize) -> Vec<StructuralUnit> {
    (0..n)
        .map(|i| {
            let base = (i + 1) as f32 * 0.1;
            StructuralUnit::new(i as u64, "blocks.0.attn", vec![base, -base * 0.5, base * 0.25])
        })
        .collect()
}
