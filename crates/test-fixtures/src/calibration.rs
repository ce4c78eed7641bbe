use birdbone_core::errors::BirdboneResult;
use birdbone_core::models::StructuralUnit;
use birdbone_core::traits::CalibrationSource;

type GradientFn = dyn Fn(usize, &StructuralUnit) -> Vec<f32> + Send + Sync;

/// Deterministic calibration source backed by a closure.
pub struct FixedGradients {
    batches: usize,
    gradient: Box<GradientFn>,
}

impl FixedGradients {
    pub fn from_fn<F>(batches: usize, gradient: F) -> Self
    where
        F: Fn(usize, &StructuralUnit) -> Vec<f32> + Send + Sync + 'static,
    {
        Self {
            batches,
            gradient: Box::new(gradient),
        }
    }

    /// Every gradient entry equals `value` on every batch.
    pub fn uniform(batches: usize, value: f32) -> Self {
        Self::from_fn(batches, move |_, unit| vec![value; unit.values.len()])
    }

    /// Gradients proportional to the values, scaled by `batch + 1`.
    pub fn proportional(batches: usize) -> Self {
        Self::from_fn(batches, |batch, unit| {
            unit.values.iter().map(|v| v * (batch + 1) as f32).collect()
        })
    }
}

impl CalibrationSource for FixedGradients {
    fn batch_count(&self) -> usize {
        self.batches
    }

    fn gradients(&self, batch: usize, unit: &StructuralUnit) -> BirdboneResult<Vec<f32>> {
        Ok((self.gradient)(batch, unit))
    }
}
