//! # birdbone-scoring
//!
//! Assigns every active structural unit a normalized importance score.
//! Three salience metrics: parameter magnitude, first-order gradient
//! saliency, and a diagonal curvature approximation. The latter two read a
//! small calibration source. Units are scored in parallel with rayon;
//! cancellation is checked between calibration batches.

pub mod algorithms;
pub mod scorer;

pub use scorer::ImportanceScorer;
