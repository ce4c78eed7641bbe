use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier of a structural unit. Ordering on ids is the
/// tie-breaker wherever scores compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub u64);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

impl From<u64> for UnitId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Whether a unit currently participates in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    Active,
    Removed,
}

/// A prunable element of the model: a weight block, attention head, or channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuralUnit {
    pub id: UnitId,
    /// Owning layer, e.g. `"blocks.3.attn"`.
    pub layer: String,
    /// Parameters of the unit. Zeroed while the unit is removed.
    pub values: Vec<f32>,
    pub state: UnitState,
    /// Normalized importance from the most recent analysis pass.
    pub score: f64,
}

impl StructuralUnit {
    /// Create an active unit with no score yet.
    pub fn new(id: impl Into<UnitId>, layer: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            id: id.into(),
            layer: layer.into(),
            values,
            state: UnitState::Active,
            score: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == UnitState::Active
    }

    /// Equality on the exact bit patterns of every field, so `-0.0 != 0.0`
    /// and identical NaN payloads compare equal.
    pub fn bitwise_eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.layer == other.layer
            && self.state == other.state
            && self.score.to_bits() == other.score.to_bits()
            && self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}
