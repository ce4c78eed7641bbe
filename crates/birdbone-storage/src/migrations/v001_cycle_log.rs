//! V001: cycle log tables and the triggers that make them append-only.

pub const MIGRATION_SQL: &str = r#"
-- One row per scoring pass. Retried cycles may score more than once.
CREATE TABLE IF NOT EXISTS importance_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cycle INTEGER NOT NULL,
    mode TEXT NOT NULL,
    unit_count INTEGER NOT NULL,
    max_raw_score REAL NOT NULL,
    record_json TEXT NOT NULL,
    recorded_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_importance_records_cycle
    ON importance_records(cycle);

-- Exactly one outcome per cycle.
CREATE TABLE IF NOT EXISTS wave_outcomes (
    cycle INTEGER PRIMARY KEY,
    wave_id TEXT,
    kind TEXT NOT NULL,
    reason TEXT NOT NULL,
    target_fraction REAL NOT NULL,
    removal_fraction REAL NOT NULL,
    units_removed INTEGER NOT NULL,
    unit_ids_json TEXT NOT NULL DEFAULT '[]',
    quality_before REAL,
    quality_after REAL,
    healing_steps INTEGER NOT NULL DEFAULT 0,
    recorded_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_wave_outcomes_kind
    ON wave_outcomes(kind);

-- Guardrail state after each cycle.
CREATE TABLE IF NOT EXISTS guardrail_trajectory (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cycle INTEGER NOT NULL,
    baseline REAL NOT NULL,
    state_json TEXT NOT NULL,
    recorded_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_guardrail_trajectory_cycle
    ON guardrail_trajectory(cycle);

-- Committed deltas kept for audit.
CREATE TABLE IF NOT EXISTS wave_deltas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    cycle INTEGER NOT NULL,
    wave_id TEXT NOT NULL,
    value_count INTEGER NOT NULL,
    delta_json TEXT NOT NULL,
    recorded_at TEXT NOT NULL
) STRICT;

CREATE INDEX IF NOT EXISTS idx_wave_deltas_wave
    ON wave_deltas(wave_id);

CREATE TRIGGER IF NOT EXISTS importance_records_no_update
    BEFORE UPDATE ON importance_records
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;
CREATE TRIGGER IF NOT EXISTS importance_records_no_delete
    BEFORE DELETE ON importance_records
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;

CREATE TRIGGER IF NOT EXISTS wave_outcomes_no_update
    BEFORE UPDATE ON wave_outcomes
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;
CREATE TRIGGER IF NOT EXISTS wave_outcomes_no_delete
    BEFORE DELETE ON wave_outcomes
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;

CREATE TRIGGER IF NOT EXISTS guardrail_trajectory_no_update
    BEFORE UPDATE ON guardrail_trajectory
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;
CREATE TRIGGER IF NOT EXISTS guardrail_trajectory_no_delete
    BEFORE DELETE ON guardrail_trajectory
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;

CREATE TRIGGER IF NOT EXISTS wave_deltas_no_update
    BEFORE UPDATE ON wave_deltas
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;
CREATE TRIGGER IF NOT EXISTS wave_deltas_no_delete
    BEFORE DELETE ON wave_deltas
    BEGIN SELECT RAISE(ABORT, 'cycle log is append-only'); END;
"#;
