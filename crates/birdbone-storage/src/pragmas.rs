//! PRAGMA configuration applied to every cycle log connection.

use rusqlite::Connection;

use birdbone_core::config::StorageConfig;
use birdbone_core::errors::BirdboneResult;

use crate::to_storage_err;

/// Apply journal, sync, and busy-timeout pragmas. In-memory databases
/// ignore WAL and keep their default journal.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> BirdboneResult<()> {
    if config.wal_mode {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    conn.execute_batch(&format!(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = {};
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Verify that WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> BirdboneResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
