//! # birdbone-shedding
//!
//! Applies a proposed wave to the model and returns the minimal delta
//! needed to undo it: the ids and prior values of touched units only.
//! Application is all-or-nothing. Restoring a delta is exact to the bit.

pub mod apply;
pub mod restore;

pub use apply::apply_wave;
pub use restore::restore_delta;
