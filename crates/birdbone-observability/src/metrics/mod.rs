//! In-memory metrics for a compression run.

pub mod dashboard;

pub use dashboard::CompressionDashboard;
