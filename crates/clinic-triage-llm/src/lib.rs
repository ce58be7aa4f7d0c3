//! Model-assisted triage assessment for clinic intake.
//!
//! This crate builds prompts for a hosted language model, parses the model's
//! JSON assessment, and provides a deterministic rule-based assessor used when
//! no model is configured. Assessments are advisory: they supply reasoning and
//! advisal text, never the stored triage score.

pub mod prompts;
pub mod extraction;

pub use extraction::*;
pub use prompts::*;
