//! # birdbone-healing
//!
//! Resolves an applied wave: runs bounded reinforcement restricted to the
//! healing scope, evaluates the quality metric, and either commits the wave
//! (moving the guardrail baseline) or restores the saved delta exactly.
//! Quality failures never surface as errors; they become rollbacks with a
//! reason code.

pub mod controller;
pub mod phase;
pub mod scope;

pub use controller::{HealingContext, HealingController, WaveResolution};
pub use phase::HealingPhase;
pub use scope::resolve_scope;
