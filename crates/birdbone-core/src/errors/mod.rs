//! Error handling for birdbone.
//! One error enum per subsystem, `thiserror` only.

pub mod birdbone_error;
pub mod config_error;
pub mod error_code;
pub mod healing_error;
pub mod model_error;
pub mod schedule_error;
pub mod scoring_error;
pub mod shedding_error;
pub mod storage_error;

pub use birdbone_error::{BirdboneError, BirdboneResult, ErrorClass};
pub use config_error::ConfigError;
pub use error_code::BirdboneErrorCode;
pub use healing_error::HealingError;
pub use model_error::ModelError;
pub use schedule_error::ScheduleError;
pub use scoring_error::ScoringError;
pub use shedding_error::SheddingError;
pub use storage_error::StorageError;
