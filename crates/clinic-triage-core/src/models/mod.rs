//! Domain models for the clinic triage system.

mod intake;
mod patient;
mod queue;

pub use intake::*;
pub use patient::*;
pub use queue::*;
