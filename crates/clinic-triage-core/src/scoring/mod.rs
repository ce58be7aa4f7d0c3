//! Triage scoring and wait estimation.
//!
//! Pipeline: Intake → TriageScorer (score + tier) → QueueIndex rank → WaitEstimator

mod scorer;
mod throughput;
mod wait;

pub use scorer::*;
pub use throughput::*;
pub use wait::*;
