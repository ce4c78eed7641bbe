//! Persistence through the SQLite cycle log and resumption after interruption.

use birdbone_core::config::{BirdboneConfig, StorageConfig};
use birdbone_core::models::{OutcomeKind, WaveOutcome};
use birdbone_engine::{open_cycle_log, CompressionEngine};
use birdbone_storage::SqliteCycleLog;
use test_fixtures::{layered_units, MockModel, ScriptedEvaluator, ScriptedReinforcer};

fn config() -> BirdboneConfig {
    let mut config = BirdboneConfig::default();
    config.waves.total_budget = 0.3;
    config.healing.step_budget = 3;
    config
}

fn shape(outcomes: &[WaveOutcome]) -> Vec<(OutcomeKind, usize)> {
    outcomes.iter().map(|o| (o.kind, o.units_removed)).collect()
}

fn fresh(model: &MockModel, evaluations: &[f64]) -> CompressionEngine {
    CompressionEngine::new(
        config(),
        Box::new(model.clone()),
        Box::new(ScriptedEvaluator::new(evaluations.to_vec())),
        Box::new(ScriptedReinforcer::descending()),
    )
    .unwrap()
}

#[test]
fn resumed_run_matches_an_uninterrupted_one() {
    let straight_model = MockModel::new(layered_units(100, 4, 8));
    let mut straight = fresh(&straight_model, &[10.0, 10.1]);
    let full = straight.run().unwrap();
    assert!(full.commits() >= 4);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cycles.db");
    let storage = StorageConfig::default();
    let model = MockModel::new(layered_units(100, 4, 8));
    {
        let log = SqliteCycleLog::open(&path, &storage).unwrap();
        let mut engine = fresh(&model, &[10.0, 10.1]).with_journal(Box::new(log));
        engine.run_cycle().unwrap();
        engine.run_cycle().unwrap();
    }

    let log = SqliteCycleLog::open(&path, &storage).unwrap();
    let mut resumed = CompressionEngine::resume(
        config(),
        Box::new(model.clone()),
        Box::new(ScriptedEvaluator::new([10.1])),
        Box::new(ScriptedReinforcer::descending()),
        Box::new(log),
    )
    .unwrap();
    assert_eq!(resumed.cycle(), 2);
    assert_eq!(resumed.history().len(), 2);
    assert_eq!(resumed.guardrail().baseline, 10.1);
    assert_eq!(resumed.guardrail().reference_baseline, 10.0);

    let rest = resumed.run().unwrap();
    assert_eq!(rest.stop_reason, full.stop_reason);
    assert_eq!(shape(resumed.history()), shape(straight.history()));
    assert_eq!(model.removed_ids(), straight_model.removed_ids());

    let reader = SqliteCycleLog::open(&path, &storage).unwrap();
    let logged = reader.outcomes().unwrap();
    let cycles: Vec<u64> = logged.iter().map(|o| o.cycle).collect();
    assert_eq!(cycles, (0..straight.history().len() as u64).collect::<Vec<_>>());
    assert_eq!(reader.records_for_cycle(0).unwrap().len(), 1);
}

#[test]
fn committed_deltas_are_retained_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.db");
    let storage = StorageConfig::default();
    let mut cfg = config();
    cfg.waves.total_budget = 0.05;
    cfg.healing.retain_deltas = true;

    let model = MockModel::new(layered_units(100, 4, 8));
    let mut engine = CompressionEngine::new(
        cfg,
        Box::new(model.clone()),
        Box::new(ScriptedEvaluator::new([10.0, 10.1])),
        Box::new(ScriptedReinforcer::descending()),
    )
    .unwrap()
    .with_journal(Box::new(SqliteCycleLog::open(&path, &storage).unwrap()));
    engine.run().unwrap();

    let wave_id = engine.history()[0].wave_id.clone().unwrap();
    let reader = SqliteCycleLog::open(&path, &storage).unwrap();
    let delta = reader.delta_for_wave(&wave_id).unwrap().unwrap();
    assert_eq!(delta.removed.len(), 5);
    assert_eq!(delta.removed_ids(), model.removed_ids());
    assert_eq!(reader.baseline_trajectory().unwrap(), vec![(0, 10.1)]);
}

#[test]
fn resume_from_an_empty_log_starts_fresh() {
    let log = open_cycle_log(&StorageConfig {
        db_path: ":memory:".to_string(),
        ..StorageConfig::default()
    })
    .unwrap();
    let evaluator = ScriptedEvaluator::new([10.0, 10.1]);
    let engine = CompressionEngine::resume(
        config(),
        Box::new(MockModel::new(layered_units(10, 1, 2))),
        Box::new(evaluator.clone()),
        Box::new(ScriptedReinforcer::descending()),
        Box::new(log),
    )
    .unwrap();
    assert_eq!(engine.cycle(), 0);
    assert_eq!(engine.guardrail().baseline, 10.0);
    assert_eq!(evaluator.calls(), 1);
}

#[test]
fn resumed_dashboard_replays_the_logged_trajectory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashboard.db");
    let storage = StorageConfig::default();
    let model = MockModel::new(layered_units(100, 4, 8));
    {
        let log = SqliteCycleLog::open(&path, &storage).unwrap();
        let mut engine = fresh(&model, &[10.0, 10.5, 10.1]).with_journal(Box::new(log));
        assert_eq!(engine.run_cycle().unwrap().kind, OutcomeKind::RolledBack);
        assert_eq!(engine.run_cycle().unwrap().kind, OutcomeKind::Committed);
    }

    let resumed = CompressionEngine::resume(
        config(),
        Box::new(model.clone()),
        Box::new(ScriptedEvaluator::new([10.1])),
        Box::new(ScriptedReinforcer::descending()),
        Box::new(SqliteCycleLog::open(&path, &storage).unwrap()),
    )
    .unwrap();
    let dashboard = resumed.dashboard();
    assert_eq!(dashboard.total_waves, 2);
    assert_eq!(dashboard.commits, 1);
    assert_eq!(dashboard.threshold_rollbacks, 1);
    // A rejected wave leaves the baseline where it was.
    assert_eq!(dashboard.baseline_trajectory, vec![(0, 10.0), (1, 10.1)]);
    assert!(dashboard.removed_fraction > 0.0);
    assert_eq!(dashboard.removed_fraction, resumed.units().removed_fraction());
}
