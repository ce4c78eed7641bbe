//! A bounded batch of shedding operations.

use serde::{Deserialize, Serialize};

use crate::errors::SheddingError;

use super::outcome::ReasonCode;
use super::unit::UnitId;

/// Lifecycle of a wave. Every wave reaches exactly one of `Committed`,
/// `RolledBack`, `Failed`, or `Terminal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    Proposed,
    Applied,
    Healing,
    Committed,
    RolledBack,
    /// Application did not happen; no unit changed.
    Failed,
    /// No-op wave telling the engine to stop.
    Terminal,
}

impl WaveStatus {
    pub fn can_transition_to(self, next: WaveStatus) -> bool {
        use WaveStatus::*;
        matches!(
            (self, next),
            (Proposed, Applied)
                | (Proposed, Failed)
                | (Applied, Healing)
                | (Applied, RolledBack)
                | (Healing, Committed)
                | (Healing, RolledBack)
        )
    }

    pub fn is_final(self) -> bool {
        matches!(
            self,
            WaveStatus::Committed | WaveStatus::RolledBack | WaveStatus::Failed | WaveStatus::Terminal
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub id: String,
    pub cycle: u64,
    /// Pacing fraction the scheduler aimed for, before budget and rounding.
    pub target_fraction: f64,
    /// Units proposed for removal, least important first.
    pub unit_ids: Vec<UnitId>,
    /// Score of the most important unit in the wave.
    pub threshold: Option<f64>,
    /// Size of the whole unit population the fractions refer to.
    pub total_units: usize,
    pub status: WaveStatus,
    /// Why the engine should stop, for terminal waves.
    pub terminal_reason: Option<ReasonCode>,
}

impl Wave {
    pub fn proposed(
        cycle: u64,
        target_fraction: f64,
        unit_ids: Vec<UnitId>,
        threshold: Option<f64>,
        total_units: usize,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            cycle,
            target_fraction,
            unit_ids,
            threshold,
            total_units,
            status: WaveStatus::Proposed,
            terminal_reason: None,
        }
    }

    /// A no-op wave that signals the engine to stop iterating.
    pub fn terminal(cycle: u64, reason: ReasonCode, total_units: usize) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            cycle,
            target_fraction: 0.0,
            unit_ids: Vec::new(),
            threshold: None,
            total_units,
            status: WaveStatus::Terminal,
            terminal_reason: Some(reason),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status == WaveStatus::Terminal
    }

    pub fn len(&self) -> usize {
        self.unit_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unit_ids.is_empty()
    }

    /// Fraction of the whole population this wave removes.
    pub fn removal_fraction(&self) -> f64 {
        if self.total_units == 0 {
            return 0.0;
        }
        self.unit_ids.len() as f64 / self.total_units as f64
    }

    /// Move to `next`, rejecting any edge outside the lifecycle.
    pub fn transition(&mut self, next: WaveStatus) -> Result<(), SheddingError> {
        if !self.status.can_transition_to(next) {
            return Err(SheddingError::InvalidTransition {
                wave_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}
