//! Ordered index over Waiting patients.
//!
//! Queue order is a strict total order:
//! 1. Higher triage score first
//! 2. Earlier arrival sequence first
//!
//! Arrival sequences are never reused, so no two entries compare equal.

mod index;
mod snapshot;

pub use index::*;
pub use snapshot::*;

use std::cmp::Ordering;

use thiserror::Error;

use crate::models::PatientId;

/// Queue index errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("Patient already queued: {0}")]
    DuplicateKey(PatientId),

    #[error("Patient not queued: {0}")]
    NotFound(PatientId),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Sort key of one queued patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueKey {
    pub triage_score: u8,
    pub arrival_sequence: u64,
    pub id: PatientId,
}

impl QueueKey {
    pub fn new(id: PatientId, triage_score: u8, arrival_sequence: u64) -> Self {
        Self {
            triage_score,
            arrival_sequence,
            id,
        }
    }
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .triage_score
            .cmp(&self.triage_score)
            .then(self.arrival_sequence.cmp(&other.arrival_sequence))
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
