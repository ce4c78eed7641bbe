//! Healing state machine: Healing -> Evaluating -> Committed, with
//! RolledBack reachable from both working states.

use std::fmt;

use birdbone_core::errors::HealingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealingPhase {
    Healing,
    Evaluating,
    Committed,
    RolledBack,
}

impl HealingPhase {
    pub fn can_transition_to(self, next: HealingPhase) -> bool {
        use HealingPhase::*;
        matches!(
            (self, next),
            (Healing, Evaluating)
                | (Healing, RolledBack)
                | (Evaluating, Committed)
                | (Evaluating, RolledBack)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, HealingPhase::Committed | HealingPhase::RolledBack)
    }

    /// Move to `next`. No phase is re-entered.
    pub fn advance(&mut self, next: HealingPhase) -> Result<(), HealingError> {
        if !self.can_transition_to(next) {
            return Err(HealingError::InvalidTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

impl fmt::Display for HealingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HealingPhase::Healing => "healing",
            HealingPhase::Evaluating => "evaluating",
            HealingPhase::Committed => "committed",
            HealingPhase::RolledBack => "rolled_back",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases_are_final() {
        let mut phase = HealingPhase::Healing;
        phase.advance(HealingPhase::Evaluating).unwrap();
        phase.advance(HealingPhase::Committed).unwrap();
        assert!(phase.is_terminal());
        assert!(phase.advance(HealingPhase::RolledBack).is_err());
        assert!(phase.advance(HealingPhase::Healing).is_err());
    }

    #[test]
    fn evaluating_cannot_go_back_to_healing() {
        let mut phase = HealingPhase::Evaluating;
        let err = phase.advance(HealingPhase::Healing).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid healing transition: evaluating -> healing"
        );
    }
}
