//! Seams to injected collaborators.

pub mod calibration;
pub mod cancellation;
pub mod evaluator;
pub mod journal;
pub mod model_access;
pub mod reinforcer;

pub use calibration::CalibrationSource;
pub use cancellation::{Cancellable, CancellationToken};
pub use evaluator::Evaluator;
pub use journal::{CycleEntry, CycleJournal, JournalSnapshot};
pub use model_access::ModelAccess;
pub use reinforcer::Reinforcer;
