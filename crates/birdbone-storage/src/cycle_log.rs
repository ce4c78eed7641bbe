//! SqliteCycleLog: the `CycleJournal` backed by one serialized connection.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;

use birdbone_core::config::StorageConfig;
use birdbone_core::errors::BirdboneResult;
use birdbone_core::models::{
    GuardrailState, ImportanceRecord, ReversibleDelta, UnitId, Wave, WaveOutcome,
};
use birdbone_core::traits::{CycleEntry, CycleJournal, JournalSnapshot};

use crate::migrations;
use crate::pragmas::apply_pragmas;
use crate::queries::{deltas, guardrail, outcomes, records};
use crate::to_storage_err;

pub struct SqliteCycleLog {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteCycleLog {
    /// Open a cycle log on disk, apply pragmas, run migrations.
    pub fn open(path: &Path, config: &StorageConfig) -> BirdboneResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        Self::initialize(conn, Some(path.to_path_buf()), config)
    }

    /// Open an in-memory cycle log (for testing).
    pub fn open_in_memory() -> BirdboneResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        let config = StorageConfig {
            wal_mode: false,
            ..StorageConfig::default()
        };
        Self::initialize(conn, None, &config)
    }

    fn initialize(
        conn: Connection,
        path: Option<PathBuf>,
        config: &StorageConfig,
    ) -> BirdboneResult<Self> {
        apply_pragmas(&conn, config)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// Database file path, `None` for in-memory logs.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn with_conn<F, T>(&self, f: F) -> BirdboneResult<T>
    where
        F: FnOnce(&Connection) -> BirdboneResult<T>,
    {
        let guard: MutexGuard<'_, Connection> = self
            .conn
            .lock()
            .map_err(|_| to_storage_err("cycle log lock poisoned".to_string()))?;
        f(&guard)
    }

    pub fn schema_version(&self) -> BirdboneResult<u32> {
        self.with_conn(migrations::current_version)
    }

    pub fn outcomes(&self) -> BirdboneResult<Vec<WaveOutcome>> {
        self.with_conn(outcomes::all_outcomes)
    }

    pub fn unit_ids_for_cycle(&self, cycle: u64) -> BirdboneResult<Vec<UnitId>> {
        self.with_conn(|conn| outcomes::unit_ids_for_cycle(conn, cycle))
    }

    pub fn records_for_cycle(&self, cycle: u64) -> BirdboneResult<Vec<ImportanceRecord>> {
        self.with_conn(|conn| records::records_for_cycle(conn, cycle))
    }

    pub fn baseline_trajectory(&self) -> BirdboneResult<Vec<(u64, f64)>> {
        self.with_conn(guardrail::baseline_trajectory)
    }

    pub fn delta_for_wave(&self, wave_id: &str) -> BirdboneResult<Option<ReversibleDelta>> {
        self.with_conn(|conn| deltas::delta_for_wave(conn, wave_id))
    }

    /// Run raw SQL against the log. Exposed for integrity checks.
    pub fn execute_raw(&self, sql: &str) -> BirdboneResult<()> {
        self.with_conn(|conn| {
            conn.execute_batch(sql)
                .map_err(|e| to_storage_err(e.to_string()))
        })
    }
}

impl CycleJournal for SqliteCycleLog {
    fn append_record(&mut self, record: &ImportanceRecord) -> BirdboneResult<()> {
        self.with_conn(|conn| records::insert_record(conn, record))
    }

    fn append_outcome(&mut self, wave: Option<&Wave>, outcome: &WaveOutcome) -> BirdboneResult<()> {
        self.with_conn(|conn| outcomes::insert_outcome(conn, wave, outcome))
    }

    fn append_guardrail(&mut self, cycle: u64, state: &GuardrailState) -> BirdboneResult<()> {
        self.with_conn(|conn| guardrail::insert_guardrail(conn, cycle, state))
    }

    fn append_delta(&mut self, cycle: u64, delta: &ReversibleDelta) -> BirdboneResult<()> {
        self.with_conn(|conn| deltas::insert_delta(conn, cycle, delta))
    }

    /// One transaction per cycle: guardrail, delta, and outcome rows are
    /// all-or-nothing.
    fn append_cycle(&mut self, entry: &CycleEntry<'_>) -> BirdboneResult<()> {
        self.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| to_storage_err(format!("append_cycle begin: {e}")))?;
            match append_cycle_inner(&tx, entry) {
                Ok(()) => tx
                    .commit()
                    .map_err(|e| to_storage_err(format!("append_cycle commit: {e}"))),
                Err(e) => {
                    let _ = tx.rollback();
                    Err(e)
                }
            }
        })
    }

    fn load(&self) -> BirdboneResult<JournalSnapshot> {
        self.with_conn(|conn| {
            Ok(JournalSnapshot {
                outcomes: outcomes::all_outcomes(conn)?,
                guardrail: guardrail::latest_guardrail(conn)?,
                last_record: records::latest_record(conn)?,
            })
        })
    }
}

fn append_cycle_inner(conn: &Connection, entry: &CycleEntry<'_>) -> BirdboneResult<()> {
    if let Some(state) = entry.guardrail {
        guardrail::insert_guardrail(conn, entry.cycle, state)?;
    }
    if let Some(delta) = entry.delta {
        deltas::insert_delta(conn, entry.cycle, delta)?;
    }
    outcomes::insert_outcome(conn, entry.wave, entry.outcome)
}
