//! # birdbone-engine
//!
//! The density-loss compression loop. Each cycle scores the active units,
//! proposes a wave, applies it, heals, and commits or rolls back before the
//! next cycle starts. There is never more than one wave in flight.
//!
//! Quality failures become rolled-back outcomes with a reason code and the
//! loop continues at a slower pace. Only configuration, data, and
//! infrastructure errors stop it.

pub mod budget;
pub mod engine;
pub mod journal;
pub mod summary;

pub use engine::CompressionEngine;
pub use journal::open_cycle_log;
pub use summary::RunSummary;
