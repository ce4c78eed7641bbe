use crate::errors::BirdboneResult;
use crate::models::{ReversibleDelta, StructuralUnit, UnitId};

/// Read and mask access to the parameterized model. Loading and saving the
/// model itself is the implementor's concern.
pub trait ModelAccess: Send {
    /// Enumerate every unit with its current values and state.
    fn list_units(&self) -> BirdboneResult<Vec<StructuralUnit>>;

    /// Zero-mask the given units. Implementations must either mask all of
    /// them or leave the model untouched and return an error.
    fn apply_mask(&mut self, unit_ids: &[UnitId]) -> BirdboneResult<()>;

    /// Write every snapshot in `delta` back into the model.
    fn restore(&mut self, delta: &ReversibleDelta) -> BirdboneResult<()>;
}
