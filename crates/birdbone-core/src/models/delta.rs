//! Minimal reversible delta: ids plus prior values of touched units only.

use serde::{Deserialize, Serialize};

use super::unit::{StructuralUnit, UnitId, UnitState};

/// Restorable state of one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub values: Vec<f32>,
    pub state: UnitState,
}

impl UnitSnapshot {
    pub fn of(unit: &StructuralUnit) -> Self {
        Self {
            id: unit.id,
            values: unit.values.clone(),
            state: unit.state,
        }
    }
}

/// Everything needed to undo one wave exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReversibleDelta {
    pub wave_id: String,
    /// Pre-removal state of the units the wave masks.
    pub removed: Vec<UnitSnapshot>,
    /// Pre-healing state of in-scope units that healing may update.
    pub healed: Vec<UnitSnapshot>,
}

impl ReversibleDelta {
    pub fn new(wave_id: impl Into<String>, removed: Vec<UnitSnapshot>) -> Self {
        Self {
            wave_id: wave_id.into(),
            removed,
            healed: Vec::new(),
        }
    }

    /// Record the state of in-scope units before healing touches them.
    /// Units already checkpointed keep their first snapshot.
    pub fn add_healing_checkpoint(&mut self, snapshots: Vec<UnitSnapshot>) {
        for snap in snapshots {
            let known = self.removed.iter().chain(&self.healed).any(|s| s.id == snap.id);
            if !known {
                self.healed.push(snap);
            }
        }
    }

    pub fn removed_ids(&self) -> Vec<UnitId> {
        self.removed.iter().map(|s| s.id).collect()
    }

    /// All snapshots, removed units first.
    pub fn snapshots(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.removed.iter().chain(self.healed.iter())
    }

    /// Number of stored parameter values, a proxy for the delta's footprint.
    pub fn value_count(&self) -> usize {
        self.snapshots().map(|s| s.values.len()).sum()
    }
}
