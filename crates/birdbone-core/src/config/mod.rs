//! Configuration system for birdbone.
//! TOML-based, 3-layer resolution: env > project file > defaults.

pub mod birdbone_config;
pub mod defaults;
pub mod engine_config;
pub mod guardrail_config;
pub mod healing_config;
pub mod observability_config;
pub mod scoring_config;
pub mod storage_config;
pub mod wave_config;

pub use birdbone_config::BirdboneConfig;
pub use engine_config::EngineConfig;
pub use guardrail_config::GuardrailConfig;
pub use healing_config::HealingConfig;
pub use observability_config::ObservabilityConfig;
pub use scoring_config::{MagnitudeNorm, ScoringConfig};
pub use storage_config::StorageConfig;
pub use wave_config::WaveConfig;
