use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use birdbone_core::errors::{BirdboneResult, StorageError};
use birdbone_core::models::{OutcomeKind, ReasonCode, UnitId, Wave, WaveOutcome};

use crate::{to_serde_err, to_storage_err};

pub fn insert_outcome(
    conn: &Connection,
    wave: Option<&Wave>,
    outcome: &WaveOutcome,
) -> BirdboneResult<()> {
    let unit_ids: Vec<UnitId> = wave.map(|w| w.unit_ids.clone()).unwrap_or_default();
    let unit_ids_json = serde_json::to_string(&unit_ids).map_err(to_serde_err)?;
    conn.execute(
        "INSERT INTO wave_outcomes
            (cycle, wave_id, kind, reason, target_fraction, removal_fraction,
             units_removed, unit_ids_json, quality_before, quality_after,
             healing_steps, recorded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            outcome.cycle as i64,
            outcome.wave_id,
            outcome.kind.as_str(),
            outcome.reason.as_str(),
            outcome.target_fraction,
            outcome.removal_fraction,
            outcome.units_removed as i64,
            unit_ids_json,
            outcome.quality_before,
            outcome.quality_after,
            outcome.healing_steps as i64,
            outcome.recorded_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All outcomes in cycle order.
pub fn all_outcomes(conn: &Connection) -> BirdboneResult<Vec<WaveOutcome>> {
    let mut stmt = conn
        .prepare(
            "SELECT cycle, wave_id, kind, reason, target_fraction, removal_fraction,
                    units_removed, quality_before, quality_after, healing_steps, recorded_at
             FROM wave_outcomes ORDER BY cycle",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], raw_outcome)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut outcomes = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        outcomes.push(raw.into_outcome()?);
    }
    Ok(outcomes)
}

/// Unit ids the wave of `cycle` touched.
pub fn unit_ids_for_cycle(conn: &Connection, cycle: u64) -> BirdboneResult<Vec<UnitId>> {
    let json: String = conn
        .query_row(
            "SELECT unit_ids_json FROM wave_outcomes WHERE cycle = ?1",
            params![cycle as i64],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    serde_json::from_str(&json).map_err(to_serde_err)
}

struct RawOutcome {
    cycle: i64,
    wave_id: Option<String>,
    kind: String,
    reason: String,
    target_fraction: f64,
    removal_fraction: f64,
    units_removed: i64,
    quality_before: Option<f64>,
    quality_after: Option<f64>,
    healing_steps: i64,
    recorded_at: String,
}

fn raw_outcome(row: &Row<'_>) -> rusqlite::Result<RawOutcome> {
    Ok(RawOutcome {
        cycle: row.get(0)?,
        wave_id: row.get(1)?,
        kind: row.get(2)?,
        reason: row.get(3)?,
        target_fraction: row.get(4)?,
        removal_fraction: row.get(5)?,
        units_removed: row.get(6)?,
        quality_before: row.get(7)?,
        quality_after: row.get(8)?,
        healing_steps: row.get(9)?,
        recorded_at: row.get(10)?,
    })
}

impl RawOutcome {
    fn into_outcome(self) -> BirdboneResult<WaveOutcome> {
        let corrupt = |what: &str, value: &str| StorageError::Serialization {
            message: format!("cycle {}: unknown {what} '{value}'", self.cycle),
        };
        let kind = OutcomeKind::parse(&self.kind).ok_or_else(|| corrupt("kind", &self.kind))?;
        let reason =
            ReasonCode::parse(&self.reason).ok_or_else(|| corrupt("reason", &self.reason))?;
        let recorded_at = DateTime::parse_from_rfc3339(&self.recorded_at)
            .map_err(|e| StorageError::Serialization {
                message: format!("cycle {}: bad timestamp: {e}", self.cycle),
            })?
            .with_timezone(&Utc);
        Ok(WaveOutcome {
            cycle: self.cycle as u64,
            wave_id: self.wave_id,
            kind,
            reason,
            target_fraction: self.target_fraction,
            removal_fraction: self.removal_fraction,
            units_removed: self.units_removed as usize,
            quality_before: self.quality_before,
            quality_after: self.quality_after,
            healing_steps: self.healing_steps as usize,
            recorded_at,
        })
    }
}
