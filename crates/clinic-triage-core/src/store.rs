//! Canonical patient record store.
//!
//! Records are never deleted; terminal records stay for audit.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{PatientId, PatientRecord, PatientStatus};

/// Outcome of a rejected status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionRejected {
    /// No record with this id
    Unknown,
    /// Record already terminal; carries its current status
    Terminal(PatientStatus),
}

/// All patient records ever created, keyed by id.
#[derive(Debug, Default, Clone)]
pub struct RecordStore {
    records: HashMap<PatientId, PatientRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: &PatientId) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &PatientId) -> Option<&PatientRecord> {
        self.records.get(id)
    }

    /// Insert a new record. Returns false if the id already exists.
    pub fn insert(&mut self, record: PatientRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        self.records.insert(record.id, record);
        true
    }

    /// Check whether `id` may move from Waiting to a terminal status.
    pub fn check_transition(&self, id: &PatientId) -> Result<&PatientRecord, TransitionRejected> {
        let record = self.records.get(id).ok_or(TransitionRejected::Unknown)?;
        if record.status.is_terminal() {
            return Err(TransitionRejected::Terminal(record.status));
        }
        Ok(record)
    }

    /// Move a Waiting record to a terminal status.
    pub fn close(
        &mut self,
        id: &PatientId,
        status: PatientStatus,
        at: DateTime<Utc>,
    ) -> Result<&PatientRecord, TransitionRejected> {
        debug_assert!(status.is_terminal());
        self.check_transition(id)?;

        let record = self
            .records
            .get_mut(id)
            .ok_or(TransitionRejected::Unknown)?;
        record.status = status;
        record.closed_at = Some(at);
        Ok(record)
    }

    /// All records ordered by arrival.
    pub fn all_by_arrival(&self) -> Vec<&PatientRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by_key(|r| r.arrival_sequence);
        records
    }

    /// Highest arrival sequence seen, if any.
    pub fn max_arrival_sequence(&self) -> Option<u64> {
        self.records.values().map(|r| r.arrival_sequence).max()
    }
}
