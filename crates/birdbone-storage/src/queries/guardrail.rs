use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use birdbone_core::errors::BirdboneResult;
use birdbone_core::models::GuardrailState;

use crate::{to_serde_err, to_storage_err};

pub fn insert_guardrail(conn: &Connection, cycle: u64, state: &GuardrailState) -> BirdboneResult<()> {
    let json = serde_json::to_string(state).map_err(to_serde_err)?;
    conn.execute(
        "INSERT INTO guardrail_trajectory (cycle, baseline, state_json, recorded_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![cycle as i64, state.baseline, json, Utc::now().to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn latest_guardrail(conn: &Connection) -> BirdboneResult<Option<GuardrailState>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT state_json FROM guardrail_trajectory ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    json.map(|j| serde_json::from_str(&j).map_err(to_serde_err))
        .transpose()
}

/// `(cycle, baseline)` pairs in write order.
pub fn baseline_trajectory(conn: &Connection) -> BirdboneResult<Vec<(u64, f64)>> {
    let mut stmt = conn
        .prepare("SELECT cycle, baseline FROM guardrail_trajectory ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)? as u64, row.get::<_, f64>(1)?)))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| to_storage_err(e.to_string()))
}
