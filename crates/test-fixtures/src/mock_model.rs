//! In-memory model with zero-mask semantics.

use std::sync::{Arc, Mutex, MutexGuard};

use birdbone_core::errors::{BirdboneResult, ModelError};
use birdbone_core::models::{ReversibleDelta, StructuralUnit, UnitId, UnitState};
use birdbone_core::traits::ModelAccess;

#[derive(Debug, Default)]
struct MockState {
    units: Vec<StructuralUnit>,
    fail_applies: usize,
    fail_restores: usize,
    apply_calls: usize,
    restore_calls: usize,
}

/// Model whose clones share one unit table, so a test can keep a handle
/// after boxing the model into an engine.
#[derive(Debug, Clone, Default)]
pub struct MockModel {
    state: Arc<Mutex<MockState>>,
}

impl MockModel {
    pub fn new(units: Vec<StructuralUnit>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                units,
                ..MockState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current units, cloned.
    pub fn units(&self) -> Vec<StructuralUnit> {
        self.lock().units.clone()
    }

    pub fn removed_ids(&self) -> Vec<UnitId> {
        self.lock()
            .units
            .iter()
            .filter(|u| !u.is_active())
            .map(|u| u.id)
            .collect()
    }

    pub fn removed_count(&self) -> usize {
        self.removed_ids().len()
    }

    /// Make the next `n` `apply_mask` calls fail without touching the model.
    pub fn fail_next_applies(&self, n: usize) {
        self.lock().fail_applies = n;
    }

    pub fn fail_next_restores(&self, n: usize) {
        self.lock().fail_restores = n;
    }

    pub fn apply_calls(&self) -> usize {
        self.lock().apply_calls
    }

    pub fn restore_calls(&self) -> usize {
        self.lock().restore_calls
    }

    /// Add `amount` to every value of the given active units, as a healing
    /// update would.
    pub fn nudge(&self, ids: &[UnitId], amount: f32) {
        let mut state = self.lock();
        for unit in state.units.iter_mut() {
            if unit.is_active() && ids.contains(&unit.id) {
                unit.values.iter_mut().for_each(|v| *v += amount);
            }
        }
    }

    /// Overwrite a unit out-of-band, e.g. to make a planned wave stale.
    pub fn force_remove(&self, id: UnitId) {
        let mut state = self.lock();
        if let Some(unit) = state.units.iter_mut().find(|u| u.id == id) {
            unit.state = UnitState::Removed;
            unit.values.iter_mut().for_each(|v| *v = 0.0);
        }
    }
}

impl ModelAccess for MockModel {
    fn list_units(&self) -> BirdboneResult<Vec<StructuralUnit>> {
        Ok(self.units())
    }

    fn apply_mask(&mut self, unit_ids: &[UnitId]) -> BirdboneResult<()> {
        let mut state = self.lock();
        state.apply_calls += 1;
        if state.fail_applies > 0 {
            state.fail_applies -= 1;
            return Err(ModelError::Access {
                reason: "injected apply failure".to_string(),
            }
            .into());
        }
        // Validate everything before changing anything.
        for id in unit_ids {
            match state.units.iter().find(|u| u.id == *id) {
                None => return Err(ModelError::MissingUnit { unit: *id }.into()),
                Some(u) if !u.is_active() => {
                    return Err(ModelError::AlreadyMasked { unit: *id }.into())
                }
                Some(_) => {}
            }
        }
        for unit in state.units.iter_mut() {
            if unit_ids.contains(&unit.id) {
                unit.state = UnitState::Removed;
                unit.values.iter_mut().for_each(|v| *v = 0.0);
            }
        }
        Ok(())
    }

    fn restore(&mut self, delta: &ReversibleDelta) -> BirdboneResult<()> {
        let mut state = self.lock();
        state.restore_calls += 1;
        if state.fail_restores > 0 {
            state.fail_restores -= 1;
            return Err(ModelError::Access {
                reason: "injected restore failure".to_string(),
            }
            .into());
        }
        for snap in delta.snapshots() {
            let unit = state
                .units
                .iter_mut()
                .find(|u| u.id == snap.id)
                .ok_or(ModelError::MissingUnit { unit: snap.id })?;
            unit.values.clone_from(&snap.values);
            unit.state = snap.state;
        }
        Ok(())
    }
}
