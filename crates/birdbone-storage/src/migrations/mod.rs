//! Schema migrations, tracked with `PRAGMA user_version`.

pub mod v001_cycle_log;

use rusqlite::Connection;
use tracing::info;

use birdbone_core::errors::{BirdboneResult, StorageError};

use crate::to_storage_err;

/// Ordered `(version, sql)` pairs. Versions start at 1.
const MIGRATIONS: &[(u32, &str)] = &[(1, v001_cycle_log::MIGRATION_SQL)];

/// Highest schema version this build knows.
pub const LATEST_VERSION: u32 = 1;

/// Current schema version of the database.
pub fn current_version(conn: &Connection) -> BirdboneResult<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Apply every migration newer than the stored version, each in its own
/// transaction together with the version bump.
pub fn run_migrations(conn: &Connection) -> BirdboneResult<u32> {
    let current = current_version(conn)?;
    if current > LATEST_VERSION {
        return Err(StorageError::MigrationFailed {
            version: current,
            reason: format!("database is newer than this build (latest {LATEST_VERSION})"),
        }
        .into());
    }
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        let batch = format!("BEGIN;\n{sql}\nPRAGMA user_version = {version};\nCOMMIT;");
        if let Err(e) = conn.execute_batch(&batch) {
            let _ = conn.execute_batch("ROLLBACK;");
            return Err(StorageError::MigrationFailed {
                version,
                reason: e.to_string(),
            }
            .into());
        }
        info!(version, "applied cycle log migration");
    }
    current_version(conn)
}
