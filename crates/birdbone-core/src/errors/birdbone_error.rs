//! Workspace-wide error aggregating all subsystem errors.

use super::error_code::{self, BirdboneErrorCode};
use super::{
    ConfigError, HealingError, ModelError, ScheduleError, ScoringError, SheddingError,
    StorageError,
};

/// Convenience alias used throughout the workspace.
pub type BirdboneResult<T> = Result<T, BirdboneError>;

/// Top-level error. Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum BirdboneError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("shedding error: {0}")]
    Shedding(#[from] SheddingError),

    #[error("healing error: {0}")]
    Healing(#[from] HealingError),

    #[error("model error: {0}")]
    Model(#[from] ModelError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Error taxonomy used by the outer loop to decide what halts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Invalid settings. Fail fast at construction.
    Configuration,
    /// Caller-supplied precondition failure. No automatic retry.
    Data,
    /// Wave could not be applied. Re-score and request a fresh wave.
    Recoverable,
    /// Quality or stability failure. Resolved through rollback.
    Quality,
    /// Normal stop signal.
    Termination,
    /// Storage or collaborator failure outside any wave.
    Infrastructure,
}

impl BirdboneError {
    /// Classify this error against the taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Config(_) => ErrorClass::Configuration,
            Self::Scoring(_) => ErrorClass::Data,
            Self::Schedule(ScheduleError::BudgetExhausted { .. }) => ErrorClass::Termination,
            Self::Schedule(ScheduleError::InvalidBudget { .. }) => ErrorClass::Data,
            Self::Shedding(SheddingError::StaleUnitReference { .. })
            | Self::Shedding(SheddingError::ApplyFailed { .. }) => ErrorClass::Recoverable,
            Self::Shedding(_) => ErrorClass::Infrastructure,
            Self::Healing(_) => ErrorClass::Quality,
            Self::Model(_) | Self::Storage(_) => ErrorClass::Infrastructure,
            Self::Cancelled => ErrorClass::Termination,
        }
    }

    /// True when the caller may re-run scoring and scheduling and try again.
    pub fn is_recoverable(&self) -> bool {
        self.class() == ErrorClass::Recoverable
    }

    /// True when the outer compression loop must stop and surface the error.
    pub fn halts_loop(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::Configuration | ErrorClass::Data | ErrorClass::Infrastructure
        )
    }
}

impl BirdboneErrorCode for BirdboneError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(e) => e.error_code(),
            Self::Scoring(e) => e.error_code(),
            Self::Schedule(e) => e.error_code(),
            Self::Shedding(e) => e.error_code(),
            Self::Healing(e) => e.error_code(),
            Self::Model(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
