//! Golden scenarios replayed end to end against the mock collaborators.

use birdbone_core::models::{ReasonCode, UnitId};
use birdbone_core::traits::CancellationToken;
use birdbone_engine::CompressionEngine;
use test_fixtures::{GoldenScenario, MockModel, ScriptedEvaluator, ScriptedReinforcer};

struct Replay {
    engine: CompressionEngine,
    model: MockModel,
    scenario: GoldenScenario,
}

fn replay(name: &str) -> Replay {
    let scenario = GoldenScenario::load(name);
    let model = MockModel::new(scenario.units());
    let token = CancellationToken::new();
    let mut reinforcer = ScriptedReinforcer::descending();
    if let Some(step) = scenario.cancel_at_step {
        reinforcer = reinforcer.cancelling_at(step, token.clone());
    }
    let engine = CompressionEngine::new(
        scenario.config(),
        Box::new(model.clone()),
        Box::new(ScriptedEvaluator::new(scenario.evaluations.clone())),
        Box::new(reinforcer),
    )
    .unwrap()
    .with_cancellation(token);
    Replay {
        engine,
        model,
        scenario,
    }
}

fn assert_matches_golden(name: &str) -> Replay {
    let mut r = replay(name);
    let summary = r.engine.run().unwrap();
    let expected = &r.scenario.expected;

    let actual: Vec<_> = summary
        .outcomes
        .iter()
        .map(|o| (o.kind, o.reason, o.units_removed))
        .collect();
    let wanted: Vec<_> = expected
        .outcomes
        .iter()
        .map(|o| (o.kind, o.reason, o.units_removed))
        .collect();
    assert_eq!(actual, wanted, "{name}: outcome sequence");

    let removed: Vec<UnitId> = expected.removed_ids.iter().copied().map(UnitId).collect();
    assert_eq!(r.model.removed_ids(), removed, "{name}: removed units");
    assert_eq!(r.engine.guardrail().baseline, expected.final_baseline);
    assert_eq!(summary.baseline, expected.final_baseline);
    r
}

#[test]
fn clean_commit() {
    let r = assert_matches_golden("clean_commit");
    let first = &r.engine.history()[0];
    assert_eq!(first.quality_before, Some(10.0));
    assert_eq!(first.quality_after, Some(10.1));
    assert_eq!(r.engine.guardrail().last_commit_cycle, Some(0));
}

#[test]
fn forced_rollback_halves_the_next_wave() {
    let r = assert_matches_golden("forced_rollback");
    let history = r.engine.history();
    assert!(history[1].units_removed <= history[0].units_removed / 2);
    assert_eq!(r.engine.dashboard().threshold_rollbacks, 1);
    assert_eq!(r.engine.dashboard().forced_rollbacks, 0);
}

#[test]
fn budget_exhaustion_stops_without_error() {
    let r = assert_matches_golden("budget_exhaustion");
    assert_eq!(r.engine.remaining_budget(), 0.0);
    assert_eq!(
        r.engine.dashboard().termination,
        Some(ReasonCode::BudgetExhausted)
    );
}

#[test]
fn cancellation_mid_heal_restores_the_model() {
    let scenario = GoldenScenario::load("cancellation_mid_heal");
    let before = scenario.units();
    let r = assert_matches_golden("cancellation_mid_heal");

    let after = r.model.units();
    assert_eq!(before.len(), after.len());
    assert!(before.iter().zip(&after).all(|(a, b)| a.bitwise_eq(b)));
    assert_eq!(r.engine.dashboard().forced_rollbacks, 1);
}

#[test]
fn every_golden_scenario_is_covered() {
    let names: Vec<String> = test_fixtures::list_fixtures("golden")
        .iter()
        .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
        .collect();
    assert_eq!(
        names,
        vec![
            "budget_exhaustion",
            "cancellation_mid_heal",
            "clean_commit",
            "forced_rollback"
        ]
    );
}
