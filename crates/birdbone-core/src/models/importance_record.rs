//! Immutable snapshot of unit importance for one analysis pass.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ScoringError;

use super::unit::UnitId;

/// Salience metric used by the importance scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Parameter norm. Needs no calibration data.
    Magnitude,
    /// First-order Taylor estimate `|Σ w·g|`.
    Gradient,
    /// Diagonal empirical-Fisher estimate `½ Σ w²·g²`.
    Curvature,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Magnitude => "magnitude",
            Self::Gradient => "gradient",
            Self::Curvature => "curvature",
        }
    }

    /// Whether the mode performs forward/backward passes over calibration batches.
    pub fn needs_calibration(&self) -> bool {
        !matches!(self, Self::Magnitude)
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "magnitude" => Ok(Self::Magnitude),
            "gradient" => Ok(Self::Gradient),
            "curvature" | "curvature-approx" | "curvature_approx" => Ok(Self::Curvature),
            other => Err(format!("unknown scoring mode '{other}'")),
        }
    }
}

/// Normalized score of one unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub unit: UnitId,
    /// Importance in [0, 1], relative to the highest raw score of the pass.
    pub score: f64,
}

/// Scores of every active unit at one cycle, sorted ascending by
/// `(score, unit id)`. Never mutated after construction; new cycles
/// produce new records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportanceRecord {
    cycle: u64,
    mode: ScoringMode,
    max_raw_score: f64,
    entries: Vec<ScoreEntry>,
}

/// Comparison of two records, used to spot unstable rankings between cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDiff {
    /// Units scored in both records.
    pub common_units: usize,
    /// Mean of `|score_now - score_before|` over the common units.
    pub mean_abs_shift: f64,
    /// Jaccard overlap of the `k` lowest-scored units of both records.
    pub candidate_overlap: f64,
}

impl ImportanceRecord {
    /// Build a record from raw, non-negative scores. Scores are divided by
    /// the largest raw score; an all-zero pass stays all-zero.
    pub fn from_raw(
        cycle: u64,
        mode: ScoringMode,
        raw: Vec<(UnitId, f64)>,
    ) -> Result<Self, ScoringError> {
        if raw.is_empty() {
            return Err(ScoringError::EmptyModel);
        }
        for &(unit, value) in &raw {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidScore { unit, value });
            }
        }

        let max_raw_score = raw.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let mut entries: Vec<ScoreEntry> = raw
            .into_iter()
            .map(|(unit, value)| ScoreEntry {
                unit,
                score: if max_raw_score > 0.0 {
                    value / max_raw_score
                } else {
                    0.0
                },
            })
            .collect();
        entries.sort_by(compare_entries);

        Ok(Self {
            cycle,
            mode,
            max_raw_score,
            entries,
        })
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn mode(&self) -> ScoringMode {
        self.mode
    }

    pub fn max_raw_score(&self) -> f64 {
        self.max_raw_score
    }

    /// Entries in ascending `(score, id)` order.
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn score_of(&self, unit: UnitId) -> Option<f64> {
        self.entries.iter().find(|e| e.unit == unit).map(|e| e.score)
    }

    /// The `k` least important units.
    pub fn lowest(&self, k: usize) -> &[ScoreEntry] {
        &self.entries[..k.min(self.entries.len())]
    }

    /// Score of the `k`-th least important unit, i.e. the removal threshold
    /// for a wave of size `k`.
    pub fn threshold_for(&self, k: usize) -> Option<f64> {
        if k == 0 {
            return None;
        }
        self.lowest(k).last().map(|e| e.score)
    }

    pub fn diff(&self, previous: &ImportanceRecord, k: usize) -> RecordDiff {
        let before: HashMap<UnitId, f64> =
            previous.entries.iter().map(|e| (e.unit, e.score)).collect();

        let mut common_units = 0usize;
        let mut total_shift = 0.0;
        for entry in &self.entries {
            if let Some(old) = before.get(&entry.unit) {
                common_units += 1;
                total_shift += (entry.score - old).abs();
            }
        }
        let mean_abs_shift = if common_units > 0 {
            total_shift / common_units as f64
        } else {
            0.0
        };

        let now: HashSet<UnitId> = self.lowest(k).iter().map(|e| e.unit).collect();
        let then: HashSet<UnitId> = previous.lowest(k).iter().map(|e| e.unit).collect();
        let union = now.union(&then).count();
        let candidate_overlap = if union > 0 {
            now.intersection(&then).count() as f64 / union as f64
        } else {
            1.0
        };

        RecordDiff {
            common_units,
            mean_abs_shift,
            candidate_overlap,
        }
    }
}

fn compare_entries(a: &ScoreEntry, b: &ScoreEntry) -> Ordering {
    a.score.total_cmp(&b.score).then(a.unit.cmp(&b.unit))
}
