//! ImportanceScorer: produces one `ImportanceRecord` per analysis pass.

use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use birdbone_core::config::{MagnitudeNorm, ScoringConfig};
use birdbone_core::errors::{BirdboneError, BirdboneResult, ScoringError};
use birdbone_core::models::{ImportanceRecord, ScoringMode, StructuralUnit, UnitId, UnitSet};
use birdbone_core::traits::{CalibrationSource, Cancellable};

use crate::algorithms::{curvature, gradient, magnitude};

/// Scores active units with the configured salience metric.
///
/// Scoring reads model state only. The same units and calibration source
/// always produce the same record.
#[derive(Debug, Clone)]
pub struct ImportanceScorer {
    mode: ScoringMode,
    norm: MagnitudeNorm,
    max_batches: usize,
}

impl ImportanceScorer {
    pub fn new(mode: ScoringMode) -> Self {
        Self::from_config(&ScoringConfig {
            mode,
            ..ScoringConfig::default()
        })
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            mode: config.mode,
            norm: config.magnitude_norm,
            max_batches: config.max_calibration_batches,
        }
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    /// Score every active unit.
    ///
    /// # Errors
    /// - `EmptyModel` when no unit is active.
    /// - `InsufficientData` when a gradient or curvature pass has no
    ///   calibration source, or the source has no batches.
    /// - `Cancelled` when `cancel` fires between batches.
    pub fn score(
        &self,
        units: &UnitSet,
        calibration: Option<&dyn CalibrationSource>,
        cancel: &dyn Cancellable,
        cycle: u64,
    ) -> BirdboneResult<ImportanceRecord> {
        let started = Instant::now();
        let active: Vec<&StructuralUnit> = units.active().collect();
        if active.is_empty() {
            return Err(ScoringError::EmptyModel.into());
        }
        if cancel.is_cancelled() {
            return Err(BirdboneError::Cancelled);
        }

        let raw: Vec<(UnitId, f64)> = match self.mode {
            ScoringMode::Magnitude => active
                .par_iter()
                .map(|u| (u.id, magnitude::score(u, self.norm)))
                .collect(),
            ScoringMode::Gradient => {
                self.calibrated(&active, calibration, cancel, gradient::batch_score)?
            }
            ScoringMode::Curvature => {
                self.calibrated(&active, calibration, cancel, curvature::batch_score)?
            }
        };

        let record = ImportanceRecord::from_raw(cycle, self.mode, raw)?;
        debug!(
            cycle,
            mode = %self.mode,
            units = record.len(),
            max_raw = record.max_raw_score(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "importance scoring complete"
        );
        Ok(record)
    }

    /// Mean per-batch salience over the calibration source.
    fn calibrated<F>(
        &self,
        active: &[&StructuralUnit],
        calibration: Option<&dyn CalibrationSource>,
        cancel: &dyn Cancellable,
        batch_score: F,
    ) -> BirdboneResult<Vec<(UnitId, f64)>>
    where
        F: Fn(&StructuralUnit, &[f32]) -> Result<f64, ScoringError> + Sync,
    {
        let source = calibration.ok_or_else(|| ScoringError::InsufficientData {
            mode: self.mode,
            reason: "no calibration source supplied".to_string(),
        })?;
        let batches = source.batch_count().min(self.max_batches);
        if batches == 0 {
            return Err(ScoringError::InsufficientData {
                mode: self.mode,
                reason: "calibration source has no batches".to_string(),
            }
            .into());
        }

        let mut totals = vec![0.0_f64; active.len()];
        for batch in 0..batches {
            if cancel.is_cancelled() {
                debug!(batch, "scoring cancelled between batches");
                return Err(BirdboneError::Cancelled);
            }
            let scores: Vec<f64> = active
                .par_iter()
                .map(|unit| -> BirdboneResult<f64> {
                    let grads = source.gradients(batch, unit)?;
                    Ok(batch_score(unit, &grads)?)
                })
                .collect::<BirdboneResult<_>>()?;
            for (total, s) in totals.iter_mut().zip(scores) {
                *total += s;
            }
        }

        let n = batches as f64;
        Ok(active
            .iter()
            .zip(totals)
            .map(|(u, total)| (u.id, total / n))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use birdbone_core::traits::CancellationToken;

    fn units() -> UnitSet {
        UnitSet::from_units(vec![
            StructuralUnit::new(0, "l0", vec![0.1, 0.1]),
            StructuralUnit::new(1, "l0", vec![3.0, 4.0]),
            StructuralUnit::new(2, "l1", vec![1.0, 0.0]),
        ])
        .unwrap()
    }

    #[test]
    fn magnitude_ranks_small_units_first() {
        let scorer = ImportanceScorer::new(ScoringMode::Magnitude);
        let record = scorer
            .score(&units(), None, &CancellationToken::new(), 0)
            .unwrap();
        let order: Vec<u64> = record.entries().iter().map(|e| e.unit.0).collect();
        assert_eq!(order, vec![0, 2, 1]);
        assert_eq!(record.score_of(UnitId(1)), Some(1.0));
    }

    #[test]
    fn removed_units_are_not_scored() {
        let mut set = units();
        set.mark_removed(UnitId(0)).unwrap();
        let record = ImportanceScorer::new(ScoringMode::Magnitude)
            .score(&set, None, &CancellationToken::new(), 1)
            .unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.score_of(UnitId(0)), None);
    }

    #[test]
    fn gradient_without_calibration_is_insufficient_data() {
        let err = ImportanceScorer::new(ScoringMode::Gradient)
            .score(&units(), None, &CancellationToken::new(), 0)
            .unwrap_err();
        assert!(matches!(
            err,
            BirdboneError::Scoring(ScoringError::InsufficientData { .. })
        ));
    }

    #[test]
    fn cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let err = ImportanceScorer::new(ScoringMode::Magnitude)
            .score(&units(), None, &token, 0)
            .unwrap_err();
        assert!(matches!(err, BirdboneError::Cancelled));
    }
}
