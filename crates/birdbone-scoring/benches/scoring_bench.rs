//! Criterion benchmarks for birdbone-scoring.
//!
//! Targets:
//! - Magnitude pass (10K units x 64 values) < 10ms
//! - Gradient pass (1K units, 8 batches) < 10ms
//! - Curvature pass (1K units, 8 batches) < 10ms

use criterion::{criterion_group, criterion_main, Criterion};

use birdbone_core::models::{ScoringMode, UnitSet};
use birdbone_core::traits::CancellationToken;
use birdbone_scoring::ImportanceScorer;
use test_fixtures::{layered_units, FixedGradients};

fn bench_magnitude(c: &mut Criterion) {
    let set = UnitSet::from_units(layered_units(10_000, 32, 64)).unwrap();
    let scorer = ImportanceScorer::new(ScoringMode::Magnitude);
    let token = CancellationToken::new();
    c.bench_function("magnitude_10k_units", |b| {
        b.iter(|| scorer.score(&set, None, &token, 0).unwrap())
    });
}

fn bench_calibrated(c: &mut Criterion) {
    let set = UnitSet::from_units(layered_units(1_000, 8, 64)).unwrap();
    let source = FixedGradients::proportional(8);
    let token = CancellationToken::new();
    for mode in [ScoringMode::Gradient, ScoringMode::Curvature] {
        let scorer = ImportanceScorer::new(mode);
        c.bench_function(&format!("{mode}_1k_units_8_batches"), |b| {
            b.iter(|| scorer.score(&set, Some(&source), &token, 0).unwrap())
        });
    }
}

criterion_group!(benches, bench_magnitude, bench_calibrated);
criterion_main!(benches);
