//! Atomic wave application.

use tracing::{debug, warn};

use birdbone_core::errors::{BirdboneError, BirdboneResult, ModelError, SheddingError};
use birdbone_core::models::{ReversibleDelta, UnitSet, Wave, WaveStatus};
use birdbone_core::traits::ModelAccess;

/// Mask every unit of `wave` in the model and mirror it in `units`.
///
/// On success the wave is `Applied` and the returned delta restores the
/// exact prior state. On any failure no unit changes and the wave is
/// `Failed`.
///
/// # Errors
/// - `StaleUnitReference` when a listed unit is already removed, in the
///   engine's view or in the model.
/// - `UnknownUnit` when a listed unit does not exist.
/// - `ApplyFailed` wrapping any other model error.
/// - `InvalidWaveStatus` when the wave is not `Proposed`.
pub fn apply_wave(
    units: &mut UnitSet,
    model: &mut dyn ModelAccess,
    wave: &mut Wave,
) -> BirdboneResult<ReversibleDelta> {
    if wave.status != WaveStatus::Proposed {
        return Err(SheddingError::InvalidWaveStatus {
            wave_id: wave.id.clone(),
            expected: WaveStatus::Proposed,
            actual: wave.status,
        }
        .into());
    }

    if let Err(e) = validate(units, wave) {
        wave.transition(WaveStatus::Failed)?;
        return Err(e.into());
    }

    let snapshots = wave
        .unit_ids
        .iter()
        .filter_map(|id| units.snapshot(*id))
        .collect();
    let delta = ReversibleDelta::new(wave.id.clone(), snapshots);

    if let Err(e) = model.apply_mask(&wave.unit_ids) {
        // Best effort: undo any partial mask.
        if let Err(restore_err) = model.restore(&delta) {
            warn!(wave_id = %wave.id, error = %restore_err, "restore after failed apply also failed");
        }
        wave.transition(WaveStatus::Failed)?;
        return Err(classify_model_failure(&wave.id, e).into());
    }

    for id in &wave.unit_ids {
        units.mark_removed(*id).map_err(|e| SheddingError::ApplyFailed {
            wave_id: wave.id.clone(),
            reason: e.to_string(),
        })?;
    }
    wave.transition(WaveStatus::Applied)?;
    debug!(
        wave_id = %wave.id,
        units = wave.len(),
        delta_values = delta.value_count(),
        "wave applied"
    );
    Ok(delta)
}

/// Every listed unit must exist and still be active.
fn validate(units: &UnitSet, wave: &Wave) -> Result<(), SheddingError> {
    for id in &wave.unit_ids {
        match units.get(*id) {
            None => {
                return Err(SheddingError::UnknownUnit {
                    wave_id: wave.id.clone(),
                    unit: *id,
                })
            }
            Some(unit) if !unit.is_active() => {
                return Err(SheddingError::StaleUnitReference {
                    wave_id: wave.id.clone(),
                    unit: *id,
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn classify_model_failure(wave_id: &str, err: BirdboneError) -> SheddingError {
    match err {
        BirdboneError::Model(ModelError::AlreadyMasked { unit }) => {
            SheddingError::StaleUnitReference {
                wave_id: wave_id.to_string(),
                unit,
            }
        }
        other => SheddingError::ApplyFailed {
            wave_id: wave_id.to_string(),
            reason: other.to_string(),
        },
    }
}
