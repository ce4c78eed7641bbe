//! CompressionEngine: owns the unit set, the wave history, and the guardrail.

use std::time::Instant;

use tracing::{debug, info};

use birdbone_core::config::BirdboneConfig;
use birdbone_core::constants::units_for_fraction;
use birdbone_core::errors::{BirdboneError, BirdboneResult, ConfigError, ScoringError};
use birdbone_core::models::{
    GuardrailState, ImportanceRecord, OutcomeKind, ReasonCode, UnitSet, Wave, WaveOutcome,
};
use birdbone_core::traits::{
    CalibrationSource, Cancellable, CancellationToken, CycleEntry, CycleJournal, Evaluator,
    JournalSnapshot, ModelAccess, Reinforcer,
};
use birdbone_healing::{HealingContext, HealingController};
use birdbone_observability::tracing_setup::events;
use birdbone_observability::{cycle_span, healing_span, scoring_span, CompressionDashboard};
use birdbone_scheduler::{ProposalMode, WaveScheduler};
use birdbone_scoring::ImportanceScorer;
use birdbone_shedding::apply_wave;

use crate::budget;
use crate::summary::RunSummary;

/// The density-loss compression engine.
///
/// Runs one wave at a time: score, propose, apply, heal, then commit or
/// roll back. The engine exclusively owns the unit set and the outcome
/// history; collaborators are injected at construction.
pub struct CompressionEngine {
    config: BirdboneConfig,
    scorer: ImportanceScorer,
    scheduler: WaveScheduler,
    healing: HealingController,
    model: Box<dyn ModelAccess>,
    evaluator: Box<dyn Evaluator>,
    reinforcer: Box<dyn Reinforcer>,
    calibration: Option<Box<dyn CalibrationSource>>,
    journal: Option<Box<dyn CycleJournal>>,
    cancel: CancellationToken,
    units: UnitSet,
    guardrail: GuardrailState,
    history: Vec<WaveOutcome>,
    last_record: Option<ImportanceRecord>,
    cycle: u64,
    dashboard: CompressionDashboard,
}

impl CompressionEngine {
    /// Validate `config`, enumerate the model, and measure the baseline.
    ///
    /// # Errors
    /// - `ConfigError` for any invalid setting. Nothing is clamped.
    /// - `EmptyModel` when the model has no units.
    /// - Evaluator failures while measuring the baseline.
    pub fn new(
        config: BirdboneConfig,
        model: Box<dyn ModelAccess>,
        mut evaluator: Box<dyn Evaluator>,
        reinforcer: Box<dyn Reinforcer>,
    ) -> BirdboneResult<Self> {
        config.validate()?;
        let units = Self::enumerate(model.as_ref())?;
        let baseline = evaluator.evaluate(&config.guardrail.metric)?;
        let guardrail = GuardrailState::new(
            config.guardrail.metric.clone(),
            config.guardrail.direction,
            baseline,
            config.guardrail.rollback_tolerance,
        )?
        .with_cumulative_tolerance(config.guardrail.cumulative_tolerance);
        info!(
            units = units.len(),
            metric = %guardrail.metric,
            baseline,
            total_budget = config.waves.total_budget,
            "compression engine ready"
        );

        Ok(Self::assemble(config, model, evaluator, reinforcer, units, guardrail))
    }

    /// Continue an interrupted run from `journal`.
    ///
    /// Logged outcomes become the scheduler history, so pacing resumes
    /// where it stopped. The logged guardrail baseline is kept; tolerances
    /// come from `config`. Cycle numbering continues after the last
    /// logged cycle. Without a logged guardrail the baseline is measured
    /// afresh, as in [`Self::new`].
    pub fn resume(
        config: BirdboneConfig,
        model: Box<dyn ModelAccess>,
        evaluator: Box<dyn Evaluator>,
        reinforcer: Box<dyn Reinforcer>,
        journal: Box<dyn CycleJournal>,
    ) -> BirdboneResult<Self> {
        let snapshot = journal.load()?;
        let Some(mut guardrail) = snapshot.guardrail.clone() else {
            let mut engine = Self::new(config, model, evaluator, reinforcer)?;
            engine.restore_history(snapshot);
            return Ok(engine.with_journal(journal));
        };
        config.validate()?;
        guardrail.tolerance = config.guardrail.rollback_tolerance;
        guardrail.cumulative_tolerance = config.guardrail.cumulative_tolerance;
        let units = Self::enumerate(model.as_ref())?;

        let mut engine = Self::assemble(config, model, evaluator, reinforcer, units, guardrail);
        engine.restore_history(snapshot);
        info!(
            next_cycle = engine.cycle,
            outcomes = engine.history.len(),
            baseline = engine.guardrail.baseline,
            removed = engine.units.removed_count(),
            "compression engine resumed"
        );
        Ok(engine.with_journal(journal))
    }

    fn enumerate(model: &dyn ModelAccess) -> BirdboneResult<UnitSet> {
        let units = UnitSet::from_units(model.list_units()?)?;
        if units.is_empty() {
            return Err(ScoringError::EmptyModel.into());
        }
        Ok(units)
    }

    fn assemble(
        config: BirdboneConfig,
        model: Box<dyn ModelAccess>,
        evaluator: Box<dyn Evaluator>,
        reinforcer: Box<dyn Reinforcer>,
        units: UnitSet,
        guardrail: GuardrailState,
    ) -> Self {
        Self {
            scorer: ImportanceScorer::from_config(&config.scoring),
            scheduler: WaveScheduler::new(config.waves.clone()),
            healing: HealingController::new(config.healing.clone()),
            config,
            model,
            evaluator,
            reinforcer,
            calibration: None,
            journal: None,
            cancel: CancellationToken::new(),
            units,
            guardrail,
            history: Vec::new(),
            last_record: None,
            cycle: 0,
            dashboard: CompressionDashboard::new(),
        }
    }

    fn restore_history(&mut self, snapshot: JournalSnapshot) {
        self.cycle = snapshot.next_cycle();
        let total = self.units.len();
        let mut removed = 0usize;
        let mut baseline = self.guardrail.reference_baseline;
        for outcome in &snapshot.outcomes {
            if outcome.kind == OutcomeKind::Committed {
                removed += outcome.units_removed;
                baseline = outcome.quality_after.unwrap_or(baseline);
            }
            let removed_fraction = if total == 0 {
                0.0
            } else {
                removed as f64 / total as f64
            };
            self.dashboard
                .record_outcome(outcome, removed_fraction, baseline);
        }
        self.history = snapshot.outcomes;
        self.last_record = snapshot.last_record;
    }

    /// Calibration batches for gradient and curvature scoring.
    pub fn with_calibration(mut self, calibration: Box<dyn CalibrationSource>) -> Self {
        self.calibration = Some(calibration);
        self
    }

    /// Append every record, outcome, and guardrail change to `journal`.
    pub fn with_journal(mut self, journal: Box<dyn CycleJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Share a caller-held cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &BirdboneConfig {
        &self.config
    }

    pub fn units(&self) -> &UnitSet {
        &self.units
    }

    pub fn guardrail(&self) -> &GuardrailState {
        &self.guardrail
    }

    pub fn history(&self) -> &[WaveOutcome] {
        &self.history
    }

    pub fn dashboard(&self) -> &CompressionDashboard {
        &self.dashboard
    }

    /// Index of the next cycle.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Fraction of the population the budget still allows removing.
    pub fn remaining_budget(&self) -> f64 {
        budget::remaining_fraction(
            self.config.waves.total_budget,
            self.units.removed_count(),
            self.units.len(),
        )
    }

    /// Raise the total compression budget. This is the only way past the
    /// configured budget; lowering it is rejected.
    pub fn extend_budget(&mut self, total_budget: f64) -> BirdboneResult<()> {
        if total_budget < self.config.waves.total_budget {
            return Err(ConfigError::ValidationFailed {
                field: "waves.total_budget".to_string(),
                message: format!(
                    "override {total_budget} is below the current budget {}",
                    self.config.waves.total_budget
                ),
            }
            .into());
        }
        let mut next = self.config.clone();
        next.waves.total_budget = total_budget;
        next.validate()?;

        info!(
            old_budget = self.config.waves.total_budget,
            new_budget = total_budget,
            "compression budget extended"
        );
        self.config = next;
        self.scheduler.set_total_budget(total_budget);
        Ok(())
    }

    /// Run cycles until a terminal outcome, a cancellation, or an error
    /// that halts the loop.
    ///
    /// # Errors
    /// Configuration, data, and infrastructure errors, plus recoverable
    /// shedding errors that outlived their retries.
    pub fn run(&mut self) -> BirdboneResult<RunSummary> {
        let started = Instant::now();
        let mut outcomes = Vec::new();
        let stop_reason = loop {
            match self.run_cycle() {
                Ok(outcome) => {
                    let stop = match outcome.kind {
                        OutcomeKind::Terminal => Some(outcome.reason),
                        OutcomeKind::RolledBack if outcome.reason == ReasonCode::Cancelled => {
                            Some(ReasonCode::Cancelled)
                        }
                        _ => None,
                    };
                    outcomes.push(outcome);
                    if let Some(reason) = stop {
                        break reason;
                    }
                }
                Err(BirdboneError::Cancelled) => {
                    info!(cycle = self.cycle, "compression cancelled between waves");
                    break ReasonCode::Cancelled;
                }
                Err(e) => return Err(e),
            }
        };

        Ok(RunSummary {
            outcomes,
            stop_reason,
            removed_fraction: self.units.removed_fraction(),
            baseline: self.guardrail.baseline,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Run exactly one cycle and return its outcome.
    ///
    /// A recoverable shedding error re-scores and re-proposes within the
    /// same cycle, up to `engine.max_apply_retries` times.
    ///
    /// # Errors
    /// `Cancelled` when cancellation is observed before a wave is applied;
    /// the model is untouched in that case. Everything else as [`Self::run`].
    pub fn run_cycle(&mut self) -> BirdboneResult<WaveOutcome> {
        let span = cycle_span!(self.cycle);
        let _enter = span.enter();

        if self.cycle >= self.config.waves.max_cycles {
            let wave = Wave::terminal(self.cycle, ReasonCode::CycleLimit, self.units.len());
            return self.finish_terminal(&wave);
        }

        let mut attempt = 0;
        let (mut wave, delta) = loop {
            if self.cancel.is_cancelled() {
                return Err(BirdboneError::Cancelled);
            }
            self.units.sync_from(self.model.list_units()?)?;
            let remaining = self.remaining_budget();
            events::cycle_started(self.cycle, self.units.active_count(), remaining);

            let Some(record) = self.score()? else {
                let wave = Wave::terminal(self.cycle, ReasonCode::NoActiveUnits, self.units.len());
                return self.finish_terminal(&wave);
            };
            let mut wave = self.scheduler.propose(
                &record,
                remaining,
                &self.history,
                self.units.len(),
                ProposalMode::AllowTerminal,
            )?;
            if wave.is_terminal() {
                return self.finish_terminal(&wave);
            }
            events::wave_proposed(self.cycle, &wave.id, wave.len(), wave.target_fraction);

            match apply_wave(&mut self.units, self.model.as_mut(), &mut wave) {
                Ok(delta) => break (wave, delta),
                Err(e) if e.is_recoverable() && attempt < self.config.engine.max_apply_retries => {
                    attempt += 1;
                    events::apply_retried(self.cycle, attempt, &e.to_string());
                }
                Err(e) => return Err(e),
            }
        };
        events::wave_applied(self.cycle, &wave.id, wave.len());

        let heal_span = healing_span!(wave.id, self.config.healing.step_budget);
        let resolution = {
            let _heal = heal_span.enter();
            let ctx = HealingContext {
                units: &mut self.units,
                model: self.model.as_mut(),
                reinforcer: self.reinforcer.as_mut(),
                evaluator: self.evaluator.as_mut(),
                cancel: &self.cancel,
            };
            self.healing
                .resolve(ctx, &mut wave, delta, &mut self.guardrail)?
        };
        let outcome = resolution.outcome;

        match outcome.kind {
            OutcomeKind::Committed => {
                events::wave_committed(self.cycle, &wave.id, wave.len(), self.guardrail.baseline)
            }
            _ => events::wave_rolled_back(
                self.cycle,
                &wave.id,
                outcome.reason.as_str(),
                outcome.forced(),
            ),
        }
        // History must match the model even when the journal write fails.
        self.record(outcome.clone());

        if let Some(journal) = self.journal.as_mut() {
            journal.append_cycle(&CycleEntry {
                cycle: outcome.cycle,
                wave: Some(&wave),
                outcome: &outcome,
                guardrail: Some(&self.guardrail),
                delta: resolution.retained_delta.as_ref(),
            })?;
        }
        if outcome.kind == OutcomeKind::Committed {
            // Healing moved in-scope weights.
            self.units.sync_from(self.model.list_units()?)?;
        }
        Ok(outcome)
    }

    /// Score the active units. `None` when nothing is left to score.
    fn score(&mut self) -> BirdboneResult<Option<ImportanceRecord>> {
        let span = scoring_span!(self.scorer.mode(), self.units.active_count());
        let _enter = span.enter();
        let record = match self.scorer.score(
            &self.units,
            self.calibration.as_deref(),
            &self.cancel,
            self.cycle,
        ) {
            Ok(record) => record,
            Err(BirdboneError::Scoring(ScoringError::EmptyModel)) => return Ok(None),
            Err(e) => return Err(e),
        };
        self.units.record_scores(&record);
        if let Some(journal) = self.journal.as_mut() {
            journal.append_record(&record)?;
        }

        let overlap = self.last_record.as_ref().map(|previous| {
            let k = units_for_fraction(self.config.waves.per_wave_cap, self.units.len()).max(1);
            let diff = record.diff(previous, k);
            debug!(
                cycle = self.cycle,
                common_units = diff.common_units,
                mean_abs_shift = diff.mean_abs_shift,
                candidate_overlap = diff.candidate_overlap,
                "importance drift since previous record"
            );
            diff.candidate_overlap
        });
        events::record_produced(self.cycle, record.mode().as_str(), record.len(), overlap);
        self.last_record = Some(record.clone());
        Ok(Some(record))
    }

    fn finish_terminal(&mut self, wave: &Wave) -> BirdboneResult<WaveOutcome> {
        let reason = wave.terminal_reason.unwrap_or(ReasonCode::BudgetExhausted);
        let outcome = WaveOutcome::terminal(self.cycle, reason);
        events::compression_terminated(self.cycle, reason.as_str(), self.units.removed_fraction());
        self.record(outcome.clone());
        if let Some(journal) = self.journal.as_mut() {
            journal.append_cycle(&CycleEntry {
                cycle: outcome.cycle,
                wave: None,
                outcome: &outcome,
                guardrail: None,
                delta: None,
            })?;
        }
        Ok(outcome)
    }

    /// Fold an outcome into the history, pacing log, and dashboard.
    fn record(&mut self, outcome: WaveOutcome) {
        let mut pacing = self.scheduler.pacing(&self.history);
        if let Some(adjustment) = pacing.observe(self.scheduler.config(), &outcome) {
            events::pacing_adjusted(
                adjustment.cycle,
                adjustment.change.as_str(),
                adjustment.old_fraction,
                adjustment.new_fraction,
            );
        }
        self.dashboard.record_outcome(
            &outcome,
            self.units.removed_fraction(),
            self.guardrail.baseline,
        );
        self.history.push(outcome);
        self.cycle += 1;
    }
}
