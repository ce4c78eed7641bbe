//! Quality baseline and the tolerance gating commit vs rollback.

use serde::{Deserialize, Serialize};

use crate::errors::HealingError;

use super::outcome::ReasonCode;

/// Which direction of the quality metric counts as better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    /// Perplexity, loss.
    LowerIsBetter,
    /// Accuracy, BLEU.
    HigherIsBetter,
}

/// Result of comparing a post-healing metric against the guardrail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GuardrailVerdict {
    Accept { degradation: f64 },
    Reject { degradation: f64, reason: ReasonCode },
}

impl GuardrailVerdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept { .. })
    }

    pub fn degradation(&self) -> f64 {
        match self {
            Self::Accept { degradation } | Self::Reject { degradation, .. } => *degradation,
        }
    }
}

/// Rolling quality baseline. Passed explicitly through the wave lifecycle
/// and only moved forward on commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailState {
    pub metric: String,
    pub direction: MetricDirection,
    /// Metric value after the last committed wave.
    pub baseline: f64,
    /// Metric value before any wave.
    pub reference_baseline: f64,
    /// Maximum relative degradation per wave.
    pub tolerance: f64,
    /// Maximum relative degradation against `reference_baseline`.
    pub cumulative_tolerance: Option<f64>,
    /// Cycle of the last commit, `None` before the first.
    pub last_commit_cycle: Option<u64>,
}

impl GuardrailState {
    pub fn new(
        metric: impl Into<String>,
        direction: MetricDirection,
        baseline: f64,
        tolerance: f64,
    ) -> Result<Self, HealingError> {
        let metric = metric.into();
        if !baseline.is_finite() {
            return Err(HealingError::EvaluationFailed {
                metric,
                reason: format!("baseline {baseline} is not finite"),
            });
        }
        Ok(Self {
            metric,
            direction,
            baseline,
            reference_baseline: baseline,
            tolerance,
            cumulative_tolerance: None,
            last_commit_cycle: None,
        })
    }

    pub fn with_cumulative_tolerance(mut self, tolerance: Option<f64>) -> Self {
        self.cumulative_tolerance = tolerance;
        self
    }

    /// Relative degradation of `observed` against `base`; positive is worse.
    /// A zero base falls back to the absolute difference.
    fn degradation_against(&self, base: f64, observed: f64) -> f64 {
        let worse_by = match self.direction {
            MetricDirection::LowerIsBetter => observed - base,
            MetricDirection::HigherIsBetter => base - observed,
        };
        if base == 0.0 {
            worse_by
        } else {
            worse_by / base.abs()
        }
    }

    /// Relative degradation against the rolling baseline.
    pub fn relative_degradation(&self, observed: f64) -> f64 {
        self.degradation_against(self.baseline, observed)
    }

    /// Relative degradation against the pre-compression baseline.
    pub fn cumulative_degradation(&self, observed: f64) -> f64 {
        self.degradation_against(self.reference_baseline, observed)
    }

    pub fn evaluate(&self, observed: f64) -> GuardrailVerdict {
        if !observed.is_finite() {
            return GuardrailVerdict::Reject {
                degradation: f64::INFINITY,
                reason: ReasonCode::NumericalDivergence,
            };
        }
        let degradation = self.relative_degradation(observed);
        if degradation > self.tolerance {
            return GuardrailVerdict::Reject {
                degradation,
                reason: ReasonCode::ThresholdExceeded,
            };
        }
        if let Some(limit) = self.cumulative_tolerance {
            if self.cumulative_degradation(observed) > limit {
                return GuardrailVerdict::Reject {
                    degradation,
                    reason: ReasonCode::CumulativeDriftExceeded,
                };
            }
        }
        GuardrailVerdict::Accept { degradation }
    }

    /// Move the rolling baseline after a committed wave.
    pub fn commit(&mut self, observed: f64, cycle: u64) {
        self.baseline = observed;
        self.last_commit_cycle = Some(cycle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perplexity(baseline: f64) -> GuardrailState {
        GuardrailState::new("perplexity", MetricDirection::LowerIsBetter, baseline, 0.03).unwrap()
    }

    #[test]
    fn one_percent_worse_is_accepted() {
        let g = perplexity(10.0);
        let verdict = g.evaluate(10.1);
        assert!(verdict.is_accept());
        assert!((verdict.degradation() - 0.01).abs() < 1e-9);
    }

    #[test]
    fn five_percent_worse_is_rejected() {
        let g = perplexity(10.0);
        assert_eq!(
            g.evaluate(10.5),
            GuardrailVerdict::Reject {
                degradation: g.relative_degradation(10.5),
                reason: ReasonCode::ThresholdExceeded
            }
        );
    }

    #[test]
    fn improvement_is_accepted() {
        assert!(perplexity(10.0).evaluate(9.0).is_accept());
    }

    #[test]
    fn higher_is_better_flips_sign() {
        let g = GuardrailState::new("accuracy", MetricDirection::HigherIsBetter, 0.8, 0.03).unwrap();
        assert!(g.evaluate(0.79).is_accept());
        assert!(!g.evaluate(0.7).is_accept());
    }

    #[test]
    fn nan_is_divergence() {
        let verdict = perplexity(10.0).evaluate(f64::NAN);
        assert!(matches!(
            verdict,
            GuardrailVerdict::Reject {
                reason: ReasonCode::NumericalDivergence,
                ..
            }
        ));
    }

    #[test]
    fn cumulative_tolerance_tracks_reference() {
        let mut g = perplexity(10.0).with_cumulative_tolerance(Some(0.04));
        g.commit(10.25, 0);
        assert!(g.evaluate(10.35).is_accept());
        g.commit(10.35, 1);
        let verdict = g.evaluate(10.45);
        assert!(matches!(
            verdict,
            GuardrailVerdict::Reject {
                reason: ReasonCode::CumulativeDriftExceeded,
                ..
            }
        ));
        assert_eq!(g.reference_baseline, 10.0);
    }

    #[test]
    fn rejects_non_finite_baseline() {
        assert!(GuardrailState::new("ppl", MetricDirection::LowerIsBetter, f64::NAN, 0.03).is_err());
    }
}
