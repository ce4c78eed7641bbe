//! Property tests for the full compression loop.

use proptest::prelude::*;

use birdbone_core::config::BirdboneConfig;
use birdbone_core::constants::units_for_fraction;
use birdbone_core::models::OutcomeKind;
use birdbone_engine::CompressionEngine;
use test_fixtures::{layered_units, MockModel, ScriptedEvaluator, ScriptedReinforcer};

const UNITS: usize = 60;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn committed_removals_never_exceed_the_budget(
        total_budget in 0.02_f64..0.6,
        per_wave_cap in 0.02_f64..0.2,
        evaluations in prop::collection::vec(9.5_f64..10.6, 2..24),
    ) {
        let mut config = BirdboneConfig::default();
        config.waves.total_budget = total_budget;
        config.waves.per_wave_cap = per_wave_cap;
        config.waves.initial_wave_fraction = per_wave_cap / 2.0;
        config.waves.min_wave_fraction = 0.001;
        config.healing.step_budget = 2;

        let model = MockModel::new(layered_units(UNITS, 3, 4));
        let mut engine = CompressionEngine::new(
            config,
            Box::new(model.clone()),
            Box::new(ScriptedEvaluator::new(evaluations)),
            Box::new(ScriptedReinforcer::descending()),
        )
        .unwrap();
        let summary = engine.run().unwrap();

        let budget = units_for_fraction(total_budget, UNITS);
        prop_assert!(model.removed_count() <= budget);

        let committed: usize = summary
            .outcomes
            .iter()
            .filter(|o| o.kind == OutcomeKind::Committed)
            .map(|o| o.units_removed)
            .sum();
        prop_assert_eq!(committed, model.removed_count());
        prop_assert!(summary.outcomes.last().is_some_and(|o| o.kind == OutcomeKind::Terminal));
    }
}
