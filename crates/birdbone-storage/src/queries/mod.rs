//! Insert and read helpers, one module per table.

pub mod deltas;
pub mod guardrail;
pub mod outcomes;
pub mod records;
