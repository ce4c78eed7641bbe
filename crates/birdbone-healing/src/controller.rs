//! HealingController: the per-wave commit/rollback decision.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use birdbone_core::config::HealingConfig;
use birdbone_core::errors::{BirdboneResult, SheddingError};
use birdbone_core::models::{
    GuardrailState, GuardrailVerdict, HealingScope, HealingSession, HealingStop, OutcomeKind,
    ReasonCode, ReversibleDelta, UnitSet, Wave, WaveOutcome, WaveStatus,
};
use birdbone_core::traits::{Cancellable, Evaluator, ModelAccess, Reinforcer};
use birdbone_shedding::restore_delta;

use crate::phase::HealingPhase;
use crate::scope::resolve_scope;

/// Collaborators borrowed for the lifetime of one wave.
pub struct HealingContext<'a> {
    pub units: &'a mut UnitSet,
    pub model: &'a mut dyn ModelAccess,
    pub reinforcer: &'a mut dyn Reinforcer,
    pub evaluator: &'a mut dyn Evaluator,
    pub cancel: &'a dyn Cancellable,
}

/// Everything one resolved wave produced.
#[derive(Debug, Clone)]
pub struct WaveResolution {
    pub outcome: WaveOutcome,
    pub session: HealingSession,
    /// The committed wave's delta, when deltas are retained for audit.
    pub retained_delta: Option<ReversibleDelta>,
}

#[derive(Debug, Clone)]
pub struct HealingController {
    config: HealingConfig,
}

impl HealingController {
    pub fn new(config: HealingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HealingConfig {
        &self.config
    }

    /// Heal, evaluate, and commit or roll back an applied wave.
    ///
    /// On commit the guardrail baseline moves to the post-healing metric.
    /// On rollback every unit in `delta`, including the healing checkpoint,
    /// is restored and the baseline is left alone.
    ///
    /// # Errors
    /// Only infrastructure failures: a wave that is not `Applied`, or a
    /// restore that fails during rollback.
    pub fn resolve(
        &self,
        ctx: HealingContext<'_>,
        wave: &mut Wave,
        mut delta: ReversibleDelta,
        guardrail: &mut GuardrailState,
    ) -> BirdboneResult<WaveResolution> {
        if wave.status != WaveStatus::Applied {
            return Err(SheddingError::InvalidWaveStatus {
                wave_id: wave.id.clone(),
                expected: WaveStatus::Applied,
                actual: wave.status,
            }
            .into());
        }
        let started = Instant::now();

        let scope = resolve_scope(ctx.units, wave, self.config.scope);
        delta.add_healing_checkpoint(
            scope
                .unit_ids
                .iter()
                .filter_map(|id| ctx.units.snapshot(*id))
                .collect(),
        );
        wave.transition(WaveStatus::Healing)?;
        let mut phase = HealingPhase::Healing;

        let mut session = HealingSession::new(
            wave.id.clone(),
            self.config.step_budget,
            self.config.learning_rate.clone(),
            guardrail.baseline,
        );
        debug!(
            wave_id = %wave.id,
            scope_units = scope.unit_ids.len(),
            layers = scope.layers.len(),
            checkpoint_values = delta.value_count(),
            "healing started"
        );

        let stop = self.run_steps(&mut session, &scope, ctx.reinforcer, ctx.cancel, started);
        session.stop = Some(stop);

        let decision = if stop.is_abort() {
            Decision::Rollback(abort_reason(stop))
        } else {
            phase.advance(HealingPhase::Evaluating)?;
            match ctx.evaluator.evaluate(&guardrail.metric) {
                Ok(observed) => {
                    session.post_quality = Some(observed);
                    let verdict = guardrail.evaluate(observed);
                    session.verdict = Some(verdict);
                    match verdict {
                        GuardrailVerdict::Accept { .. } => Decision::Commit(observed),
                        GuardrailVerdict::Reject { reason, .. } => Decision::Rollback(reason),
                    }
                }
                Err(e) => {
                    warn!(wave_id = %wave.id, error = %e, "evaluation failed, rolling back");
                    Decision::Rollback(ReasonCode::EvaluationFailed)
                }
            }
        };

        let (kind, reason, retained_delta) = match decision {
            Decision::Commit(observed) => {
                phase.advance(HealingPhase::Committed)?;
                wave.transition(WaveStatus::Committed)?;
                guardrail.commit(observed, wave.cycle);
                info!(
                    wave_id = %wave.id,
                    cycle = wave.cycle,
                    baseline = observed,
                    steps = session.steps_taken(),
                    "wave committed"
                );
                let retained = self.config.retain_deltas.then_some(delta);
                (OutcomeKind::Committed, ReasonCode::WithinTolerance, retained)
            }
            Decision::Rollback(reason) => {
                phase.advance(HealingPhase::RolledBack)?;
                restore_delta(ctx.units, ctx.model, &delta)?;
                wave.transition(WaveStatus::RolledBack)?;
                info!(
                    wave_id = %wave.id,
                    cycle = wave.cycle,
                    reason = %reason,
                    forced = reason.is_forced_rollback(),
                    steps = session.steps_taken(),
                    "wave rolled back"
                );
                (OutcomeKind::RolledBack, reason, None)
            }
        };
        session.elapsed_ms = started.elapsed().as_millis() as u64;

        let outcome = WaveOutcome {
            cycle: wave.cycle,
            wave_id: Some(wave.id.clone()),
            kind,
            reason,
            target_fraction: wave.target_fraction,
            removal_fraction: wave.removal_fraction(),
            units_removed: wave.len(),
            quality_before: Some(session.pre_quality),
            quality_after: session.post_quality,
            healing_steps: session.steps_taken(),
            recorded_at: Utc::now(),
        };
        Ok(WaveResolution {
            outcome,
            session,
            retained_delta,
        })
    }

    /// Run reinforcement steps until the budget, convergence, or an abort.
    ///
    /// A cancellation or timeout raised during the final step still wins
    /// over convergence and budget exhaustion.
    fn run_steps(
        &self,
        session: &mut HealingSession,
        scope: &HealingScope,
        reinforcer: &mut dyn Reinforcer,
        cancel: &dyn Cancellable,
        started: Instant,
    ) -> HealingStop {
        let stop = self.step_until_stop(session, scope, reinforcer, cancel, started);
        if stop.is_abort() {
            return stop;
        }
        self.interruption(session, cancel, started, session.steps_taken())
            .unwrap_or(stop)
    }

    fn step_until_stop(
        &self,
        session: &mut HealingSession,
        scope: &HealingScope,
        reinforcer: &mut dyn Reinforcer,
        cancel: &dyn Cancellable,
        started: Instant,
    ) -> HealingStop {
        let budget = self.config.step_budget;
        for step in 0..budget {
            if let Some(stop) = self.interruption(session, cancel, started, step) {
                return stop;
            }

            let rate = session.schedule.rate_at(step, budget);
            match reinforcer.step(scope, rate) {
                Ok(loss) if loss.is_finite() => {
                    session.losses.push(loss);
                    if session
                        .has_stabilized(self.config.convergence_window, self.config.convergence_epsilon)
                    {
                        debug!(wave_id = %session.wave_id, step, loss, "healing converged");
                        return HealingStop::Converged;
                    }
                }
                Ok(loss) => {
                    warn!(wave_id = %session.wave_id, step, loss, "numerical divergence");
                    return HealingStop::Diverged;
                }
                Err(e) => {
                    warn!(wave_id = %session.wave_id, step, error = %e, "healing step failed");
                    return HealingStop::StepFailed;
                }
            }
        }
        HealingStop::StepBudgetExhausted
    }

    /// Cancellation or an elapsed wave timeout, if either has happened.
    fn interruption(
        &self,
        session: &HealingSession,
        cancel: &dyn Cancellable,
        started: Instant,
        step: usize,
    ) -> Option<HealingStop> {
        if cancel.is_cancelled() {
            debug!(wave_id = %session.wave_id, step, "cancellation observed");
            return Some(HealingStop::Cancelled);
        }
        if self
            .config
            .wave_timeout()
            .is_some_and(|limit| started.elapsed() >= limit)
        {
            warn!(wave_id = %session.wave_id, step, "healing timeout");
            return Some(HealingStop::TimedOut);
        }
        None
    }
}

enum Decision {
    Commit(f64),
    Rollback(ReasonCode),
}

fn abort_reason(stop: HealingStop) -> ReasonCode {
    match stop {
        HealingStop::Diverged => ReasonCode::NumericalDivergence,
        HealingStop::StepFailed => ReasonCode::HealingFailed,
        HealingStop::Cancelled => ReasonCode::Cancelled,
        HealingStop::TimedOut => ReasonCode::HealingTimeout,
        // Not aborts; listed for exhaustiveness.
        HealingStop::Converged | HealingStop::StepBudgetExhausted => ReasonCode::WithinTolerance,
    }
}
