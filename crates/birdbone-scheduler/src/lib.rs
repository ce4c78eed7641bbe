//! # birdbone-scheduler
//!
//! Decides how many units each wave removes. Pacing starts conservative,
//! grows after a window of consecutive commits, and backs off
//! exponentially after any rollback. The scheduler keeps no state of its
//! own: pacing is replayed from the outcome history on every proposal, so
//! a resumed run proposes exactly what an uninterrupted one would.

pub mod pacing;
pub mod scheduler;

pub use pacing::{PacingAdjustment, PacingChange, PacingState};
pub use scheduler::{ProposalMode, WaveScheduler};
