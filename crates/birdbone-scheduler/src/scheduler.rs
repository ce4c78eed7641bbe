//! WaveScheduler: turns an importance record into a wave proposal.

use tracing::debug;

use birdbone_core::config::WaveConfig;
use birdbone_core::constants::{units_for_fraction, FRACTION_EPSILON};
use birdbone_core::errors::{BirdboneResult, ScheduleError};
use birdbone_core::models::{ImportanceRecord, ReasonCode, Wave, WaveOutcome};

use crate::pacing::PacingState;

/// What the caller accepts back when the budget is spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalMode {
    /// A terminal no-op wave is an acceptable answer.
    AllowTerminal,
    /// The caller needs a real wave; an exhausted budget is an error.
    RequireWave,
}

#[derive(Debug, Clone)]
pub struct WaveScheduler {
    config: WaveConfig,
}

impl WaveScheduler {
    pub fn new(config: WaveConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    /// Replace the overall budget. Validation is the caller's concern.
    pub fn set_total_budget(&mut self, total_budget: f64) {
        self.config.total_budget = total_budget;
    }

    /// Pace implied by `history`.
    pub fn pacing(&self, history: &[WaveOutcome]) -> PacingState {
        PacingState::replay(&self.config, history)
    }

    /// Propose the next wave.
    ///
    /// `remaining_budget` is the fraction of the whole population that may
    /// still be removed. `total_units` is the size of that population,
    /// removed units included. The wave holds the lowest-scored units of
    /// `record`, at most `min(pace, per_wave_cap, remaining_budget)` of the
    /// population.
    ///
    /// Returns a terminal wave when the budget is below the minimum viable
    /// wave, when there is nothing left to score, or when the trailing
    /// rollbacks reach `max_consecutive_rollbacks`.
    ///
    /// # Errors
    /// - `InvalidBudget` when `remaining_budget` lies outside [0, 1].
    /// - `BudgetExhausted` in `RequireWave` mode when the budget is spent.
    pub fn propose(
        &self,
        record: &ImportanceRecord,
        remaining_budget: f64,
        history: &[WaveOutcome],
        total_units: usize,
        mode: ProposalMode,
    ) -> BirdboneResult<Wave> {
        if !(0.0..=1.0).contains(&remaining_budget) {
            return Err(ScheduleError::InvalidBudget {
                value: remaining_budget,
            }
            .into());
        }
        let cycle = record.cycle();
        if total_units == 0 || record.is_empty() {
            return Ok(Wave::terminal(cycle, ReasonCode::NoActiveUnits, total_units));
        }

        let pacing = self.pacing(history);
        if pacing.consecutive_rollbacks >= self.config.max_consecutive_rollbacks {
            debug!(
                cycle,
                rollbacks = pacing.consecutive_rollbacks,
                "rollback limit reached"
            );
            return Ok(Wave::terminal(cycle, ReasonCode::RollbackLimit, total_units));
        }

        // Largest wave the cap and budget allow, regardless of pace.
        let ceiling = units_for_fraction(self.config.per_wave_cap.min(remaining_budget), total_units)
            .min(record.len());
        if remaining_budget + FRACTION_EPSILON < self.config.min_wave_fraction || ceiling == 0 {
            return match mode {
                ProposalMode::AllowTerminal => {
                    Ok(Wave::terminal(cycle, ReasonCode::BudgetExhausted, total_units))
                }
                ProposalMode::RequireWave => Err(ScheduleError::BudgetExhausted {
                    removed: (self.config.total_budget - remaining_budget).max(0.0),
                    budget: self.config.total_budget,
                }
                .into()),
            };
        }

        // A pace smaller than one unit still removes one.
        let k = units_for_fraction(pacing.fraction, total_units).clamp(1, ceiling);
        let unit_ids = record.lowest(k).iter().map(|e| e.unit).collect();
        let wave = Wave::proposed(
            cycle,
            pacing.fraction,
            unit_ids,
            record.threshold_for(k),
            total_units,
        );
        debug!(
            cycle,
            wave_id = %wave.id,
            units = k,
            pace = pacing.fraction,
            remaining_budget,
            "wave proposed"
        );
        Ok(wave)
    }
}
