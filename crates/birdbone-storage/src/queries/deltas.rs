use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use birdbone_core::errors::BirdboneResult;
use birdbone_core::models::ReversibleDelta;

use crate::{to_serde_err, to_storage_err};

pub fn insert_delta(conn: &Connection, cycle: u64, delta: &ReversibleDelta) -> BirdboneResult<()> {
    let json = serde_json::to_string(delta).map_err(to_serde_err)?;
    conn.execute(
        "INSERT INTO wave_deltas (cycle, wave_id, value_count, delta_json, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            cycle as i64,
            delta.wave_id,
            delta.value_count() as i64,
            json,
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn delta_for_wave(conn: &Connection, wave_id: &str) -> BirdboneResult<Option<ReversibleDelta>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT delta_json FROM wave_deltas WHERE wave_id = ?1 ORDER BY id DESC LIMIT 1",
            params![wave_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    json.map(|j| serde_json::from_str(&j).map_err(to_serde_err))
        .transpose()
}
