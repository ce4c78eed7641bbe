//! Arena of structural units indexed by id.

use std::collections::{BTreeSet, HashMap};

use crate::errors::ModelError;

use super::delta::UnitSnapshot;
use super::importance_record::ImportanceRecord;
use super::unit::{StructuralUnit, UnitId, UnitState};

/// The engine's view of every unit in the model. Units are stored once and
/// referenced by index; deltas copy only the units they touch.
#[derive(Debug, Clone, Default)]
pub struct UnitSet {
    units: Vec<StructuralUnit>,
    index: HashMap<UnitId, usize>,
}

impl UnitSet {
    /// Build a set from the units enumerated by the model.
    pub fn from_units(units: Vec<StructuralUnit>) -> Result<Self, ModelError> {
        let mut index = HashMap::with_capacity(units.len());
        for (pos, unit) in units.iter().enumerate() {
            if index.insert(unit.id, pos).is_some() {
                return Err(ModelError::DuplicateUnit { unit: unit.id });
            }
        }
        Ok(Self { units, index })
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn get(&self, id: UnitId) -> Option<&StructuralUnit> {
        self.index.get(&id).map(|&pos| &self.units[pos])
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut StructuralUnit> {
        match self.index.get(&id) {
            Some(&pos) => Some(&mut self.units[pos]),
            None => None,
        }
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StructuralUnit> {
        self.units.iter()
    }

    pub fn active(&self) -> impl Iterator<Item = &StructuralUnit> {
        self.units.iter().filter(|u| u.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn removed_count(&self) -> usize {
        self.units.len() - self.active_count()
    }

    /// Fraction of all units currently removed.
    pub fn removed_fraction(&self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        self.removed_count() as f64 / self.units.len() as f64
    }

    /// Distinct layers owning the given units.
    pub fn layers_of(&self, ids: &[UnitId]) -> BTreeSet<String> {
        ids.iter()
            .filter_map(|id| self.get(*id))
            .map(|u| u.layer.clone())
            .collect()
    }

    /// Active units owned by any of `layers`, in arena order.
    pub fn active_in_layers(&self, layers: &BTreeSet<String>) -> Vec<UnitId> {
        self.active()
            .filter(|u| layers.contains(&u.layer))
            .map(|u| u.id)
            .collect()
    }

    /// Copy of a unit's restorable state.
    pub fn snapshot(&self, id: UnitId) -> Option<UnitSnapshot> {
        self.get(id).map(UnitSnapshot::of)
    }

    /// Write a snapshot back into the arena.
    pub fn apply_snapshot(&mut self, snapshot: &UnitSnapshot) -> Result<(), ModelError> {
        let unit = self
            .get_mut(snapshot.id)
            .ok_or(ModelError::MissingUnit { unit: snapshot.id })?;
        unit.values.clone_from(&snapshot.values);
        unit.state = snapshot.state;
        Ok(())
    }

    /// Mark a unit removed and zero its parameters, mirroring a zero-mask.
    pub fn mark_removed(&mut self, id: UnitId) -> Result<(), ModelError> {
        let unit = self.get_mut(id).ok_or(ModelError::MissingUnit { unit: id })?;
        unit.state = UnitState::Removed;
        unit.values.iter_mut().for_each(|v| *v = 0.0);
        Ok(())
    }

    /// Adopt the model's current values and states. The set of ids must not change.
    pub fn sync_from(&mut self, units: Vec<StructuralUnit>) -> Result<(), ModelError> {
        if units.len() != self.units.len() {
            return Err(ModelError::Access {
                reason: format!(
                    "model enumerated {} units, engine tracks {}",
                    units.len(),
                    self.units.len()
                ),
            });
        }
        for incoming in units {
            let unit = self
                .get_mut(incoming.id)
                .ok_or(ModelError::MissingUnit { unit: incoming.id })?;
            unit.values = incoming.values;
            unit.state = incoming.state;
        }
        Ok(())
    }

    /// Store the normalized scores of an analysis pass on the units.
    pub fn record_scores(&mut self, record: &ImportanceRecord) {
        for entry in record.entries() {
            if let Some(unit) = self.get_mut(entry.unit) {
                unit.score = entry.score;
            }
        }
    }

    /// Bit-for-bit equality of every unit, in arena order.
    pub fn bitwise_eq(&self, other: &Self) -> bool {
        self.units.len() == other.units.len()
            && self
                .units
                .iter()
                .zip(&other.units)
                .all(|(a, b)| a.bitwise_eq(b))
    }
}

impl PartialEq for UnitSet {
    fn eq(&self, other: &Self) -> bool {
        self.units == other.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> UnitSet {
        UnitSet::from_units(vec![
            StructuralUnit::new(1, "l0", vec![1.0, -2.0]),
            StructuralUnit::new(2, "l0", vec![0.5]),
            StructuralUnit::new(3, "l1", vec![3.0]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = UnitSet::from_units(vec![
            StructuralUnit::new(1, "a", vec![]),
            StructuralUnit::new(1, "b", vec![]),
        ])
        .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateUnit { .. }));
    }

    #[test]
    fn mark_removed_then_snapshot_restores() {
        let mut units = set();
        let before = units.clone();
        let snap = units.snapshot(UnitId(1)).unwrap();
        units.mark_removed(UnitId(1)).unwrap();
        assert_eq!(units.removed_count(), 1);
        assert_eq!(units.get(UnitId(1)).unwrap().values, vec![0.0, 0.0]);
        units.apply_snapshot(&snap).unwrap();
        assert!(units.bitwise_eq(&before));
    }

    #[test]
    fn active_in_layers_skips_removed() {
        let mut units = set();
        units.mark_removed(UnitId(2)).unwrap();
        let layers = units.layers_of(&[UnitId(2)]);
        assert_eq!(units.active_in_layers(&layers), vec![UnitId(1)]);
    }

    #[test]
    fn removed_fraction_of_all_units() {
        let mut units = set();
        units.mark_removed(UnitId(3)).unwrap();
        assert!((units.removed_fraction() - 1.0 / 3.0).abs() < 1e-12);
    }
}
