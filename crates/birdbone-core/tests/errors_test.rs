use birdbone_core::errors::*;
use birdbone_core::models::{ScoringMode, UnitId};

#[test]
fn codes_are_stable() {
    let err: BirdboneError = ScheduleError::BudgetExhausted {
        removed: 0.15,
        budget: 0.15,
    }
    .into();
    assert_eq!(err.error_code(), "BUDGET_EXHAUSTED");
    assert!(err.coded_string().starts_with("[BUDGET_EXHAUSTED]"));

    let err: BirdboneError = ScoringError::InsufficientData {
        mode: ScoringMode::Gradient,
        reason: "no calibration source".into(),
    }
    .into();
    assert_eq!(err.error_code(), "INSUFFICIENT_DATA");
    assert_eq!(BirdboneError::Cancelled.error_code(), "CANCELLED");
}

#[test]
fn only_configuration_data_and_infrastructure_halt_the_loop() {
    let config: BirdboneError = ConfigError::ValidationFailed {
        field: "waves.total_budget".into(),
        message: "too big".into(),
    }
    .into();
    assert_eq!(config.class(), ErrorClass::Configuration);
    assert!(config.halts_loop());

    let data: BirdboneError = ScoringError::EmptyModel.into();
    assert_eq!(data.class(), ErrorClass::Data);
    assert!(data.halts_loop());

    let stale: BirdboneError = SheddingError::StaleUnitReference {
        wave_id: "w".into(),
        unit: UnitId(4),
    }
    .into();
    assert!(stale.is_recoverable());
    assert!(!stale.halts_loop());

    let exhausted: BirdboneError = ScheduleError::BudgetExhausted {
        removed: 1.0,
        budget: 1.0,
    }
    .into();
    assert_eq!(exhausted.class(), ErrorClass::Termination);
    assert!(!exhausted.halts_loop());

    let diverged: BirdboneError = HealingError::Diverged { step: 3, loss: f64::NAN }.into();
    assert_eq!(diverged.class(), ErrorClass::Quality);
    assert!(!diverged.halts_loop());
}

#[test]
fn display_includes_context() {
    let err = SheddingError::StaleUnitReference {
        wave_id: "w-1".into(),
        unit: UnitId(12),
    };
    assert_eq!(
        err.to_string(),
        "unit u12 referenced by wave w-1 is already removed"
    );
}
