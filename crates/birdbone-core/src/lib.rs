//! # birdbone-core
//!
//! Foundation crate for the birdbone density-loss compression engine.
//! Defines the data model, collaborator traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::BirdboneConfig;
pub use errors::{BirdboneError, BirdboneResult};
pub use models::{
    GuardrailState, ImportanceRecord, OutcomeKind, ReasonCode, ReversibleDelta, StructuralUnit,
    UnitId, UnitSet, UnitState, Wave, WaveOutcome, WaveStatus,
};
pub use traits::{CancellationToken, Cancellable};
