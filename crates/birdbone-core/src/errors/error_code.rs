//! Stable error codes for callers that log or match on strings.

/// Every error enum implements this to provide a structured error code.
pub trait BirdboneErrorCode {
    /// Returns the error code string (e.g., "BUDGET_EXHAUSTED").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const EMPTY_MODEL: &str = "EMPTY_MODEL";
pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
pub const SCORING_ERROR: &str = "SCORING_ERROR";
pub const BUDGET_EXHAUSTED: &str = "BUDGET_EXHAUSTED";
pub const SCHEDULE_ERROR: &str = "SCHEDULE_ERROR";
pub const STALE_UNIT_REFERENCE: &str = "STALE_UNIT_REFERENCE";
pub const APPLY_FAILED: &str = "APPLY_FAILED";
pub const SHEDDING_ERROR: &str = "SHEDDING_ERROR";
pub const HEALING_ERROR: &str = "HEALING_ERROR";
pub const MODEL_ERROR: &str = "MODEL_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const CANCELLED: &str = "CANCELLED";
