//! Data model for the density-loss compression loop.

pub mod delta;
pub mod guardrail;
pub mod healing_session;
pub mod importance_record;
pub mod lr_schedule;
pub mod outcome;
pub mod unit;
pub mod unit_set;
pub mod wave;

pub use delta::{ReversibleDelta, UnitSnapshot};
pub use guardrail::{GuardrailState, GuardrailVerdict, MetricDirection};
pub use healing_session::{
    HealingScope, HealingScopeMode, HealingSession, HealingStop, SessionTerminal,
};
pub use importance_record::{ImportanceRecord, RecordDiff, ScoreEntry, ScoringMode};
pub use lr_schedule::LearningRateSchedule;
pub use outcome::{OutcomeKind, ReasonCode, WaveOutcome};
pub use unit::{StructuralUnit, UnitId, UnitState};
pub use unit_set::UnitSet;
pub use wave::{Wave, WaveStatus};
