//! Property tests for the wave scheduler: budget bound and backoff tightening.

use chrono::Utc;
use proptest::prelude::*;

use birdbone_core::config::WaveConfig;
use birdbone_core::models::{
    ImportanceRecord, OutcomeKind, ReasonCode, ScoringMode, UnitId, WaveOutcome,
};
use birdbone_scheduler::{ProposalMode, WaveScheduler};

fn record(n: usize) -> ImportanceRecord {
    ImportanceRecord::from_raw(
        0,
        ScoringMode::Magnitude,
        (0..n as u64).map(|i| (UnitId(i), (i * 7 % 13) as f64)).collect(),
    )
    .unwrap()
}

fn outcome(cycle: u64, committed: bool, units: usize, total: usize) -> WaveOutcome {
    WaveOutcome {
        cycle,
        wave_id: Some(format!("w{cycle}")),
        kind: if committed {
            OutcomeKind::Committed
        } else {
            OutcomeKind::RolledBack
        },
        reason: if committed {
            ReasonCode::WithinTolerance
        } else {
            ReasonCode::ThresholdExceeded
        },
        target_fraction: units as f64 / total as f64,
        removal_fraction: units as f64 / total as f64,
        units_removed: units,
        quality_before: None,
        quality_after: None,
        healing_steps: 0,
        recorded_at: Utc::now(),
    }
}

proptest! {
    #[test]
    fn wave_never_exceeds_cap_or_remaining_budget(
        n in 20usize..500,
        remaining in 0.0f64..=1.0,
        commits in prop::collection::vec(any::<bool>(), 0..12),
    ) {
        let scheduler = WaveScheduler::new(WaveConfig::default());
        let history: Vec<_> = commits
            .iter()
            .enumerate()
            .map(|(c, ok)| outcome(c as u64, *ok, n / 20, n))
            .collect();
        let wave = scheduler
            .propose(&record(n), remaining, &history, n, ProposalMode::AllowTerminal)
            .unwrap();
        let removal = wave.removal_fraction();
        prop_assert!(removal <= remaining + 1e-9);
        prop_assert!(removal <= scheduler.config().per_wave_cap + 1e-9);
    }

    #[test]
    fn next_wave_after_rollback_is_no_larger(
        n in 20usize..500,
        commits_before in 0usize..8,
        rollbacks in 1usize..5,
    ) {
        let scheduler = WaveScheduler::new(WaveConfig::default());
        let mut history = Vec::new();
        let mut cycle = 0u64;
        for _ in 0..commits_before {
            let wave = scheduler
                .propose(&record(n), 1.0, &history, n, ProposalMode::AllowTerminal)
                .unwrap();
            history.push(outcome(cycle, true, wave.len(), n));
            cycle += 1;
        }
        for _ in 0..rollbacks {
            let failing = scheduler
                .propose(&record(n), 1.0, &history, n, ProposalMode::AllowTerminal)
                .unwrap();
            prop_assume!(!failing.is_terminal());
            history.push(outcome(cycle, false, failing.len(), n));
            cycle += 1;
            let next = scheduler
                .propose(&record(n), 1.0, &history, n, ProposalMode::AllowTerminal)
                .unwrap();
            prop_assert!(next.len() <= failing.len());
        }
    }
}

#[test]
fn six_trailing_rollbacks_end_the_run() {
    let scheduler = WaveScheduler::new(WaveConfig::default());
    let history: Vec<_> = (0..6).map(|c| outcome(c, false, 1, 100)).collect();
    let wave = scheduler
        .propose(&record(100), 0.5, &history, 100, ProposalMode::AllowTerminal)
        .unwrap();
    assert!(wave.is_terminal());
    assert_eq!(wave.terminal_reason, Some(ReasonCode::RollbackLimit));
}

#[test]
fn halving_from_ten_units_gives_five() {
    let config = WaveConfig {
        per_wave_cap: 0.1,
        initial_wave_fraction: 0.1,
        ..WaveConfig::default()
    };
    let scheduler = WaveScheduler::new(config);
    let first = scheduler
        .propose(&record(100), 1.0, &[], 100, ProposalMode::AllowTerminal)
        .unwrap();
    assert_eq!(first.len(), 10);
    let history = vec![outcome(0, false, 10, 100)];
    let next = scheduler
        .propose(&record(100), 1.0, &history, 100, ProposalMode::AllowTerminal)
        .unwrap();
    assert_eq!(next.len(), 5);
}
