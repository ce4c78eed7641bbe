use chrono::Utc;

use birdbone_core::config::StorageConfig;
use birdbone_core::models::{
    GuardrailState, ImportanceRecord, MetricDirection, OutcomeKind, ReasonCode, ReversibleDelta,
    ScoringMode, StructuralUnit, UnitId, UnitSnapshot, Wave, WaveOutcome,
};
use birdbone_core::traits::{CycleEntry, CycleJournal};
use birdbone_storage::migrations::LATEST_VERSION;
use birdbone_storage::SqliteCycleLog;

fn record(cycle: u64) -> ImportanceRecord {
    ImportanceRecord::from_raw(
        cycle,
        ScoringMode::Magnitude,
        vec![(UnitId(0), 1.0), (UnitId(1), 3.0), (UnitId(2), 2.0)],
    )
    .unwrap()
}

fn committed(cycle: u64, wave: &Wave) -> WaveOutcome {
    WaveOutcome {
        cycle,
        wave_id: Some(wave.id.clone()),
        kind: OutcomeKind::Committed,
        reason: ReasonCode::WithinTolerance,
        target_fraction: wave.target_fraction,
        removal_fraction: wave.removal_fraction(),
        units_removed: wave.len(),
        quality_before: Some(10.0),
        quality_after: Some(10.1),
        healing_steps: 5,
        recorded_at: Utc::now(),
    }
}

fn guardrail(baseline: f64) -> GuardrailState {
    GuardrailState::new("perplexity", MetricDirection::LowerIsBetter, baseline, 0.03).unwrap()
}

#[test]
fn fresh_log_is_migrated_and_empty() {
    let log = SqliteCycleLog::open_in_memory().unwrap();
    assert_eq!(log.schema_version().unwrap(), LATEST_VERSION);
    let snapshot = log.load().unwrap();
    assert!(snapshot.outcomes.is_empty());
    assert!(snapshot.guardrail.is_none());
    assert!(snapshot.last_record.is_none());
    assert_eq!(snapshot.next_cycle(), 0);
}

#[test]
fn appended_history_loads_back() {
    let mut log = SqliteCycleLog::open_in_memory().unwrap();
    let wave = Wave::proposed(0, 0.1, vec![UnitId(0)], Some(0.33), 3);

    log.append_record(&record(0)).unwrap();
    log.append_outcome(Some(&wave), &committed(0, &wave)).unwrap();
    let mut state = guardrail(10.0);
    state.commit(10.1, 0);
    log.append_guardrail(0, &state).unwrap();

    log.append_record(&record(1)).unwrap();
    log.append_outcome(None, &WaveOutcome::terminal(1, ReasonCode::BudgetExhausted))
        .unwrap();
    log.append_guardrail(1, &state).unwrap();

    let snapshot = log.load().unwrap();
    assert_eq!(snapshot.outcomes.len(), 2);
    assert_eq!(snapshot.outcomes[0].kind, OutcomeKind::Committed);
    assert_eq!(snapshot.outcomes[0].wave_id.as_deref(), Some(wave.id.as_str()));
    assert_eq!(snapshot.outcomes[0].quality_after, Some(10.1));
    assert_eq!(snapshot.outcomes[1].reason, ReasonCode::BudgetExhausted);
    assert_eq!(snapshot.next_cycle(), 2);
    assert_eq!(snapshot.guardrail, Some(state));
    assert_eq!(snapshot.last_record, Some(record(1)));

    assert_eq!(log.unit_ids_for_cycle(0).unwrap(), vec![UnitId(0)]);
    assert!(log.unit_ids_for_cycle(1).unwrap().is_empty());
    assert_eq!(log.baseline_trajectory().unwrap(), vec![(0, 10.1), (1, 10.1)]);
}

#[test]
fn rows_cannot_be_updated_or_deleted() {
    let mut log = SqliteCycleLog::open_in_memory().unwrap();
    let wave = Wave::proposed(0, 0.1, vec![UnitId(0)], None, 3);
    log.append_record(&record(0)).unwrap();
    log.append_outcome(Some(&wave), &committed(0, &wave)).unwrap();
    log.append_guardrail(0, &guardrail(10.0)).unwrap();

    for sql in [
        "UPDATE wave_outcomes SET kind = 'rolled_back'",
        "DELETE FROM wave_outcomes",
        "UPDATE importance_records SET cycle = 9",
        "DELETE FROM importance_records",
        "UPDATE guardrail_trajectory SET baseline = 0",
        "DELETE FROM guardrail_trajectory",
    ] {
        let err = log.execute_raw(sql).unwrap_err();
        assert!(err.to_string().contains("append-only"), "{sql}: {err}");
    }
    assert_eq!(log.outcomes().unwrap()[0].kind, OutcomeKind::Committed);
}

#[test]
fn one_outcome_per_cycle() {
    let mut log = SqliteCycleLog::open_in_memory().unwrap();
    let wave = Wave::proposed(0, 0.1, vec![UnitId(0)], None, 3);
    log.append_outcome(Some(&wave), &committed(0, &wave)).unwrap();
    assert!(log.append_outcome(Some(&wave), &committed(0, &wave)).is_err());
}

#[test]
fn retained_delta_roundtrips_exactly() {
    let mut log = SqliteCycleLog::open_in_memory().unwrap();
    let unit = StructuralUnit::new(4, "blocks.1.mlp", vec![0.1, -3.5e-8, 1.0e30]);
    let delta = ReversibleDelta::new("wave-a", vec![UnitSnapshot::of(&unit)]);
    log.append_delta(3, &delta).unwrap();
    assert_eq!(log.delta_for_wave("wave-a").unwrap(), Some(delta));
    assert_eq!(log.delta_for_wave("missing").unwrap(), None);
    assert!(log.execute_raw("DELETE FROM wave_deltas").is_err());
}

#[test]
fn scores_recorded_per_retry() {
    let mut log = SqliteCycleLog::open_in_memory().unwrap();
    log.append_record(&record(2)).unwrap();
    log.append_record(&record(2)).unwrap();
    assert_eq!(log.records_for_cycle(2).unwrap().len(), 2);
}

#[test]
fn on_disk_log_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("birdbone.db");
    let config = StorageConfig::default();
    {
        let mut log = SqliteCycleLog::open(&path, &config).unwrap();
        log.append_outcome(None, &WaveOutcome::terminal(0, ReasonCode::CycleLimit))
            .unwrap();
    }
    let log = SqliteCycleLog::open(&path, &config).unwrap();
    assert_eq!(log.schema_version().unwrap(), LATEST_VERSION);
    assert_eq!(log.path(), Some(path.as_path()));
    let snapshot = log.load().unwrap();
    assert_eq!(snapshot.outcomes.len(), 1);
    assert_eq!(snapshot.outcomes[0].reason, ReasonCode::CycleLimit);
}

#[test]
fn cycle_entry_is_written_together() {
    let mut log = SqliteCycleLog::open_in_memory().unwrap();
    let wave = Wave::proposed(0, 0.1, vec![UnitId(1)], Some(0.5), 3);
    let mut state = guardrail(10.0);
    state.commit(10.1, 0);
    let unit = StructuralUnit::new(UnitId(1), "blocks.0.mlp", vec![0.5, -0.5]);
    let delta = ReversibleDelta::new(wave.id.clone(), vec![UnitSnapshot::of(&unit)]);
    let outcome = committed(0, &wave);

    log.append_cycle(&CycleEntry {
        cycle: 0,
        wave: Some(&wave),
        outcome: &outcome,
        guardrail: Some(&state),
        delta: Some(&delta),
    })
    .unwrap();

    let snapshot = log.load().unwrap();
    assert_eq!(snapshot.outcomes.len(), 1);
    assert_eq!(snapshot.guardrail, Some(state));
    assert_eq!(log.baseline_trajectory().unwrap(), vec![(0, 10.1)]);
    assert_eq!(log.delta_for_wave(&wave.id).unwrap(), Some(delta));
}

#[test]
fn failed_cycle_entry_leaves_no_partial_rows() {
    let mut log = SqliteCycleLog::open_in_memory().unwrap();
    let wave = Wave::proposed(0, 0.1, vec![UnitId(1)], Some(0.5), 3);
    let outcome = committed(0, &wave);
    log.append_outcome(Some(&wave), &outcome).unwrap();

    let mut state = guardrail(10.0);
    state.commit(10.1, 0);
    let unit = StructuralUnit::new(UnitId(1), "blocks.0.mlp", vec![0.5, -0.5]);
    let delta = ReversibleDelta::new(wave.id.clone(), vec![UnitSnapshot::of(&unit)]);
    // The outcome row collides on cycle 0, so the whole entry is rolled back.
    let err = log
        .append_cycle(&CycleEntry {
            cycle: 0,
            wave: Some(&wave),
            outcome: &outcome,
            guardrail: Some(&state),
            delta: Some(&delta),
        })
        .unwrap_err();
    assert!(matches!(err, birdbone_core::errors::BirdboneError::Storage(_)));

    assert!(log.baseline_trajectory().unwrap().is_empty());
    assert!(log.load().unwrap().guardrail.is_none());
    assert!(log.delta_for_wave(&wave.id).unwrap().is_none());
    assert_eq!(log.outcomes().unwrap().len(), 1);
}
