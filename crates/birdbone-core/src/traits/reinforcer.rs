use crate::errors::BirdboneResult;
use crate::models::HealingScope;

/// Runs healing optimization updates.
pub trait Reinforcer: Send {
    /// Perform one update restricted to `scope` and return the training loss.
    fn step(&mut self, scope: &HealingScope, learning_rate: f64) -> BirdboneResult<f64>;
}
