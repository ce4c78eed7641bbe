use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use birdbone_core::errors::BirdboneResult;
use birdbone_core::models::ImportanceRecord;

use crate::{to_serde_err, to_storage_err};

pub fn insert_record(conn: &Connection, record: &ImportanceRecord) -> BirdboneResult<()> {
    let json = serde_json::to_string(record).map_err(to_serde_err)?;
    conn.execute(
        "INSERT INTO importance_records
            (cycle, mode, unit_count, max_raw_score, record_json, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.cycle() as i64,
            record.mode().as_str(),
            record.len() as i64,
            record.max_raw_score(),
            json,
            Utc::now().to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Most recently written record.
pub fn latest_record(conn: &Connection) -> BirdboneResult<Option<ImportanceRecord>> {
    let json: Option<String> = conn
        .query_row(
            "SELECT record_json FROM importance_records ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    json.map(|j| serde_json::from_str(&j).map_err(to_serde_err))
        .transpose()
}

/// Every record written for `cycle`, oldest first.
pub fn records_for_cycle(conn: &Connection, cycle: u64) -> BirdboneResult<Vec<ImportanceRecord>> {
    let mut stmt = conn
        .prepare("SELECT record_json FROM importance_records WHERE cycle = ?1 ORDER BY id")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![cycle as i64], |row| row.get::<_, String>(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut records = Vec::new();
    for row in rows {
        let json = row.map_err(|e| to_storage_err(e.to_string()))?;
        records.push(serde_json::from_str(&json).map_err(to_serde_err)?);
    }
    Ok(records)
}
