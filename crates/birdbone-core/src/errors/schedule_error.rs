use super::error_code::{self, BirdboneErrorCode};

/// Wave scheduling errors.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    /// Normal termination signal: nothing left to remove under the budget.
    #[error("compression budget exhausted: {removed:.4} of {budget:.4} already removed")]
    BudgetExhausted { removed: f64, budget: f64 },

    #[error("remaining budget {value} outside [0, 1]")]
    InvalidBudget { value: f64 },
}

impl BirdboneErrorCode for ScheduleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BudgetExhausted { .. } => error_code::BUDGET_EXHAUSTED,
            Self::InvalidBudget { .. } => error_code::SCHEDULE_ERROR,
        }
    }
}
