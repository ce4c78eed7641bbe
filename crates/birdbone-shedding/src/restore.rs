//! Exact restoration from a reversible delta.

use tracing::debug;

use birdbone_core::errors::{BirdboneResult, SheddingError};
use birdbone_core::models::{ReversibleDelta, UnitSet};
use birdbone_core::traits::ModelAccess;

/// Write every snapshot of `delta` back into the model and into `units`.
/// Removed units come back active with their original values; healed units
/// return to their pre-healing values.
pub fn restore_delta(
    units: &mut UnitSet,
    model: &mut dyn ModelAccess,
    delta: &ReversibleDelta,
) -> BirdboneResult<()> {
    model
        .restore(delta)
        .map_err(|e| SheddingError::RestoreFailed {
            wave_id: delta.wave_id.clone(),
            reason: e.to_string(),
        })?;
    for snapshot in delta.snapshots() {
        units
            .apply_snapshot(snapshot)
            .map_err(|e| SheddingError::RestoreFailed {
                wave_id: delta.wave_id.clone(),
                reason: e.to_string(),
            })?;
    }
    debug!(
        wave_id = %delta.wave_id,
        removed = delta.removed.len(),
        healed = delta.healed.len(),
        "delta restored"
    );
    Ok(())
}
