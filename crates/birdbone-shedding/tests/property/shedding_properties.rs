//! Apply then restore is the identity, bit for bit.

use proptest::prelude::*;

use birdbone_core::models::{StructuralUnit, UnitId, UnitSet, Wave};
use birdbone_shedding::{apply_wave, restore_delta};
use test_fixtures::MockModel;

fn arb_units() -> impl Strategy<Value = Vec<StructuralUnit>> {
    prop::collection::vec(prop::collection::vec(any::<f32>(), 0..6), 1..40).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, values)| StructuralUnit::new(i as u64, format!("l{}", i % 3), values))
            .collect()
    })
}

proptest! {
    #[test]
    fn apply_then_restore_is_identity(
        units in arb_units(),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 1..10),
    ) {
        let n = units.len();
        let mut ids: Vec<UnitId> = picks.iter().map(|p| UnitId(p.index(n) as u64)).collect();
        ids.sort();
        ids.dedup();

        let mut set = UnitSet::from_units(units.clone()).unwrap();
        let before = set.clone();
        let mut model = MockModel::new(units);
        let model_before = model.units();

        let mut wave = Wave::proposed(0, 0.1, ids, None, n);
        let delta = apply_wave(&mut set, &mut model, &mut wave).unwrap();
        restore_delta(&mut set, &mut model, &delta).unwrap();

        prop_assert!(set.bitwise_eq(&before));
        let restored = UnitSet::from_units(model.units()).unwrap();
        prop_assert!(restored.bitwise_eq(&UnitSet::from_units(model_before).unwrap()));
    }
}
