//! Compression budget accounting in whole units.

use birdbone_core::constants::units_for_fraction;

/// Units the budget allows in total for a population of `total_units`.
pub fn budget_units(total_budget: f64, total_units: usize) -> usize {
    units_for_fraction(total_budget, total_units)
}

/// Fraction of the population still removable. Counting in whole units
/// keeps repeated subtraction from drifting past the budget.
pub fn remaining_fraction(total_budget: f64, removed: usize, total_units: usize) -> f64 {
    if total_units == 0 {
        return 0.0;
    }
    let left = budget_units(total_budget, total_units).saturating_sub(removed);
    left as f64 / total_units as f64
}
