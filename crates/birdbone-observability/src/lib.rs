//! # birdbone-observability
//!
//! Tracing initialization, span macros and structured events for each
//! step of the compression loop, plus the in-memory wave dashboard.

pub mod metrics;
pub mod tracing_setup;

pub use metrics::CompressionDashboard;
pub use tracing_setup::init_tracing;
