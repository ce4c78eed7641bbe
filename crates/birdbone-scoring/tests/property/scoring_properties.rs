//! Property tests for importance scoring.

use proptest::prelude::*;

use birdbone_core::errors::{BirdboneError, ScoringError};
use birdbone_core::models::{ScoringMode, StructuralUnit, UnitSet};
use birdbone_core::traits::{Cancellable, CancellationToken};
use birdbone_scoring::ImportanceScorer;
use test_fixtures::{layered_units, FixedGradients};

fn unit_strategy() -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec(prop::collection::vec(-10.0_f32..10.0, 1..6), 1..40)
}

fn to_set(values: Vec<Vec<f32>>) -> UnitSet {
    let units = values
        .into_iter()
        .enumerate()
        .map(|(i, v)| StructuralUnit::new(i as u64, format!("blocks.{}.mlp", i % 3), v))
        .collect();
    UnitSet::from_units(units).unwrap()
}

proptest! {
    #[test]
    fn scoring_is_idempotent(values in unit_strategy(), mode_idx in 0usize..3) {
        let mode = [ScoringMode::Magnitude, ScoringMode::Gradient, ScoringMode::Curvature][mode_idx];
        let set = to_set(values);
        let source = FixedGradients::proportional(3);
        let scorer = ImportanceScorer::new(mode);
        let token = CancellationToken::new();

        let first = scorer.score(&set, Some(&source), &token, 4).unwrap();
        let second = scorer.score(&set, Some(&source), &token, 4).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn normalized_scores_stay_in_unit_interval(values in unit_strategy()) {
        let set = to_set(values);
        let record = ImportanceScorer::new(ScoringMode::Magnitude)
            .score(&set, None, &CancellationToken::new(), 0)
            .unwrap();
        prop_assert_eq!(record.len(), set.len());
        for entry in record.entries() {
            prop_assert!((0.0..=1.0).contains(&entry.score));
        }
        let scores: Vec<f64> = record.entries().iter().map(|e| e.score).collect();
        prop_assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn cancellation_between_batches() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    let source = FixedGradients::from_fn(4, move |_, unit| {
        trigger.cancel();
        vec![1.0; unit.values.len()]
    });
    let set = UnitSet::from_units(layered_units(10, 2, 4)).unwrap();

    let err = ImportanceScorer::new(ScoringMode::Gradient)
        .score(&set, Some(&source), &token, 0)
        .unwrap_err();
    assert!(matches!(err, BirdboneError::Cancelled));
    assert!(token.is_cancelled());
}

#[test]
fn misshapen_gradients_are_rejected() {
    let source = FixedGradients::from_fn(1, |_, _| vec![1.0]);
    let set = UnitSet::from_units(layered_units(4, 1, 3)).unwrap();
    let err = ImportanceScorer::new(ScoringMode::Curvature)
        .score(&set, Some(&source), &CancellationToken::new(), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        BirdboneError::Scoring(ScoringError::ShapeMismatch { expected: 3, actual: 1, .. })
    ));
}

#[test]
fn empty_calibration_source_is_insufficient_data() {
    let set = UnitSet::from_units(layered_units(4, 1, 3)).unwrap();
    let err = ImportanceScorer::new(ScoringMode::Gradient)
        .score(&set, Some(&FixedGradients::uniform(0, 1.0)), &CancellationToken::new(), 0)
        .unwrap_err();
    assert!(matches!(
        err,
        BirdboneError::Scoring(ScoringError::InsufficientData { .. })
    ));
}

#[test]
fn all_removed_is_empty_model() {
    let mut set = UnitSet::from_units(layered_units(3, 1, 2)).unwrap();
    let ids: Vec<_> = set.iter().map(|u| u.id).collect();
    for id in ids {
        set.mark_removed(id).unwrap();
    }
    let err = ImportanceScorer::new(ScoringMode::Magnitude)
        .score(&set, None, &CancellationToken::new(), 0)
        .unwrap_err();
    assert!(matches!(err, BirdboneError::Scoring(ScoringError::EmptyModel)));
}
