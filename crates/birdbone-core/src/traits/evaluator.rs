use crate::errors::BirdboneResult;

/// Supplies the quality signal the guardrail consults.
pub trait Evaluator: Send {
    /// Compute `metric_name` (e.g. validation perplexity) on the current model.
    fn evaluate(&mut self, metric_name: &str) -> BirdboneResult<f64>;
}
