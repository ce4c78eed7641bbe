//! Span definitions per loop stage: cycle, scoring, healing.

/// Create a span covering one compression cycle.
#[macro_export]
macro_rules! cycle_span {
    ($cycle:expr) => {
        tracing::info_span!("birdbone.cycle", cycle = $cycle)
    };
}

/// Create a scoring span.
#[macro_export]
macro_rules! scoring_span {
    ($mode:expr, $units:expr) => {
        tracing::debug_span!("birdbone.scoring", mode = %$mode, units = $units)
    };
}

/// Create a healing span for one wave.
#[macro_export]
macro_rules! healing_span {
    ($wave_id:expr, $step_budget:expr) => {
        tracing::info_span!("birdbone.healing", wave_id = %$wave_id, step_budget = $step_budget)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const CYCLE: &str = "birdbone.cycle";
    pub const SCORING: &str = "birdbone.scoring";
    pub const HEALING: &str = "birdbone.healing";
}
