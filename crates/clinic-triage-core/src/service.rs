//! Triage queue service.
//!
//! Owns the record store and the queue index behind one lock. Every mutation
//! (intake, complete, cancel) holds the write lock across the journal write,
//! the store update and the index update, so readers never see one without
//! the other. Positions and wait estimates are derived on every read.

use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{QueueConfig, TriageConfig};
use crate::db::{Database, DbError};
use crate::models::{
    IntakeForm, IntakeReceipt, PatientId, PatientRecord, PatientStatus, StatsSnapshot,
    UrgencyBreakdown, WaitingPatient,
};
use crate::queue::{IndexError, QueueIndex, QueueSnapshot};
use crate::scoring::{ThroughputTracker, TriageScorer, WaitEstimator};
use crate::store::{RecordStore, TransitionRejected};

/// Service errors.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("Patient not found: {0}")]
    NotFound(PatientId),

    #[error("Patient {id} is already {status}")]
    InvalidTransition { id: PatientId, status: PatientStatus },

    #[error("Duplicate queue key for patient {0}")]
    DuplicateKey(PatientId),

    #[error("Queue index out of sync for patient {0}")]
    IndexDesync(PatientId),

    #[error("Journal error: {0}")]
    Storage(#[from] DbError),

    #[error("Queue state lock poisoned")]
    LockPoisoned,
}

/// Caller-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; 400-equivalent
    Validation,
    /// Unknown id; 404-equivalent
    NotFound,
    /// Terminal record targeted; 409-equivalent
    Conflict,
    /// Invariant violation or storage failure; 500-equivalent
    Internal,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::InvalidTransition { .. } => ErrorKind::Conflict,
            ServiceError::DuplicateKey(_)
            | ServiceError::IndexDesync(_)
            | ServiceError::Storage(_)
            | ServiceError::LockPoisoned => ErrorKind::Internal,
        }
    }

    /// True when the store and index can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ServiceError::DuplicateKey(_)
                | ServiceError::IndexDesync(_)
                | ServiceError::LockPoisoned
        )
    }
}

impl From<IndexError> for ServiceError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::DuplicateKey(id) => ServiceError::DuplicateKey(id),
            IndexError::NotFound(id) => ServiceError::NotFound(id),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// State guarded by the service lock.
#[derive(Debug)]
struct QueueState {
    records: RecordStore,
    index: QueueIndex,
    next_sequence: u64,
    throughput: ThroughputTracker,
}

impl QueueState {
    fn new(config: &QueueConfig) -> Self {
        Self {
            records: RecordStore::new(),
            index: QueueIndex::new(),
            next_sequence: 1,
            throughput: ThroughputTracker::new(
                config.throughput_window_minutes,
                config.throughput_min_samples,
            ),
        }
    }
}

/// Intake, queue reads, and terminal transitions over one consistent state.
#[derive(Debug)]
pub struct TriageQueueService {
    state: RwLock<QueueState>,
    journal: Option<Mutex<Database>>,
    scorer: TriageScorer,
    estimator: WaitEstimator,
}

impl Default for TriageQueueService {
    fn default() -> Self {
        Self::new(&TriageConfig::default())
    }
}

impl TriageQueueService {
    /// Create an in-memory service with no journal.
    pub fn new(config: &TriageConfig) -> Self {
        Self {
            state: RwLock::new(QueueState::new(&config.queue)),
            journal: None,
            scorer: TriageScorer::new(),
            estimator: WaitEstimator::new(config.queue.default_service_minutes),
        }
    }

    /// Create a service, opening and replaying the journal if one is configured.
    pub fn from_config(config: &TriageConfig) -> ServiceResult<Self> {
        match &config.storage.database_path {
            Some(path) => Self::restore(config, Database::open(path)?),
            None => Ok(Self::new(config)),
        }
    }

    /// Rebuild state from a journal and keep writing to it.
    pub fn restore(config: &TriageConfig, db: Database) -> ServiceResult<Self> {
        let mut state = QueueState::new(&config.queue);
        let mut completions: Vec<DateTime<Utc>> = Vec::new();

        for record in db.list_patients()? {
            if record.is_waiting() {
                state
                    .index
                    .insert(record.id, record.triage_score, record.arrival_sequence)?;
            }
            if record.status == PatientStatus::Completed {
                completions.extend(record.closed_at);
            }

            let id = record.id;
            if !state.records.insert(record) {
                error!(patient_id = %id, "journal contains duplicate patient id");
                return Err(ServiceError::DuplicateKey(id));
            }
        }

        state.next_sequence = state
            .records
            .max_arrival_sequence()
            .map_or(1, |sequence| sequence + 1);

        completions.sort();
        for at in completions {
            state.throughput.record(at);
        }

        info!(
            records = state.records.len(),
            waiting = state.index.len(),
            next_sequence = state.next_sequence,
            "restored triage queue from journal"
        );

        Ok(Self {
            state: RwLock::new(state),
            journal: Some(Mutex::new(db)),
            scorer: TriageScorer::new(),
            estimator: WaitEstimator::new(config.queue.default_service_minutes),
        })
    }

    /// Register a patient and return their position and estimated wait.
    pub fn intake(&self, form: IntakeForm) -> ServiceResult<IntakeReceipt> {
        if let Err(message) = form.validate() {
            debug!(%message, "intake rejected");
            return Err(ServiceError::Validation(message));
        }

        let score = self
            .scorer
            .score(form.urgency_level, form.visit_type, form.estimated_duration);

        let mut guard = self.write()?;
        let state = &mut *guard;
        let now = Utc::now();

        let record = PatientRecord {
            id: PatientId::new(),
            name: form.contact.name.trim().to_string(),
            email: form.contact.email.trim().to_string(),
            phone: form.contact.phone.trim().to_string(),
            symptoms: form.symptoms.trim().to_string(),
            urgency_level: form.urgency_level,
            visit_type: form.visit_type,
            estimated_duration: form.estimated_duration,
            triage_score: score.value,
            tier: score.tier,
            status: PatientStatus::Waiting,
            arrival_sequence: state.next_sequence,
            created_at: now,
            closed_at: None,
        };

        if state.records.contains(&record.id) || state.index.contains(&record.id) {
            error!(patient_id = %record.id, "generated id already present");
            return Err(ServiceError::DuplicateKey(record.id));
        }

        if let Some(journal) = &self.journal {
            if let Err(e) = lock_journal(journal)?.insert_patient(&record) {
                warn!(patient_id = %record.id, error = %e, "journal insert failed");
                return Err(e.into());
            }
        }

        state.next_sequence += 1;
        state
            .index
            .insert(record.id, record.triage_score, record.arrival_sequence)?;
        state.records.insert(record.clone());

        let position = state.index.position_of(&record.id)?;
        let estimated_wait = self
            .estimator
            .estimate(position, self.throughput(state, now));

        info!(
            patient_id = %record.id,
            triage_score = record.triage_score,
            tier = %record.tier,
            position,
            waiting = state.index.len(),
            "patient queued"
        );

        Ok(IntakeReceipt {
            record,
            position,
            estimated_wait,
        })
    }

    /// Waiting patients in queue order with live positions and estimates.
    pub fn list_waiting(&self) -> ServiceResult<Vec<WaitingPatient>> {
        let state = self.read()?;
        let throughput = self.throughput(&state, Utc::now());
        let snapshot = state.index.ordered_snapshot();

        let patients = snapshot
            .positioned()
            .map(|(position, id)| {
                let record = waiting_record(&state, &id)?;
                Ok(WaitingPatient {
                    record: record.clone(),
                    position,
                    estimated_wait: self.estimator.estimate(position, throughput),
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        debug!(waiting = patients.len(), "listed queue");
        Ok(patients)
    }

    /// Aggregate statistics over the Waiting set.
    pub fn stats(&self) -> ServiceResult<StatsSnapshot> {
        let state = self.read()?;
        let total_waiting = state.index.len() as u32;
        let throughput = self.throughput(&state, Utc::now());

        let mut by_urgency = UrgencyBreakdown::default();
        for id in &state.index.ordered_snapshot() {
            by_urgency.count(waiting_record(&state, id)?.urgency_band());
        }

        Ok(StatsSnapshot {
            total_waiting,
            avg_wait_time: self.estimator.aggregate(1..=total_waiting, throughput),
            by_urgency,
        })
    }

    /// 1-based position of a Waiting patient.
    pub fn position_of(&self, id: &PatientId) -> ServiceResult<u32> {
        let state = self.read()?;
        Ok(state.index.position_of(id)?)
    }

    /// Live queue row for one Waiting patient.
    pub fn queue_entry(&self, id: &PatientId) -> ServiceResult<WaitingPatient> {
        let state = self.read()?;
        let position = state.index.position_of(id)?;
        let record = waiting_record(&state, id)?;
        Ok(WaitingPatient {
            record: record.clone(),
            position,
            estimated_wait: self
                .estimator
                .estimate(position, self.throughput(&state, Utc::now())),
        })
    }

    /// Immutable view of the current queue order.
    pub fn snapshot(&self) -> ServiceResult<QueueSnapshot> {
        Ok(self.read()?.index.ordered_snapshot())
    }

    /// Any record, regardless of status.
    pub fn patient(&self, id: &PatientId) -> ServiceResult<PatientRecord> {
        self.read()?
            .records
            .get(id)
            .cloned()
            .ok_or(ServiceError::NotFound(*id))
    }

    /// Every record ever created, by arrival.
    pub fn records(&self) -> ServiceResult<Vec<PatientRecord>> {
        Ok(self
            .read()?
            .records
            .all_by_arrival()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Mark a Waiting patient as seen.
    pub fn complete(&self, id: &PatientId) -> ServiceResult<PatientRecord> {
        self.close(id, PatientStatus::Completed)
    }

    /// Withdraw a Waiting patient from the queue.
    pub fn cancel(&self, id: &PatientId) -> ServiceResult<PatientRecord> {
        self.close(id, PatientStatus::Cancelled)
    }

    fn close(&self, id: &PatientId, status: PatientStatus) -> ServiceResult<PatientRecord> {
        let mut guard = self.write()?;
        let state = &mut *guard;

        if let Err(rejected) = state.records.check_transition(id) {
            let err = rejection(*id, rejected);
            warn!(patient_id = %id, requested = %status, error = %err, "transition rejected");
            return Err(err);
        }
        if !state.index.contains(id) {
            error!(patient_id = %id, "waiting patient missing from queue index");
            return Err(ServiceError::IndexDesync(*id));
        }

        let now = Utc::now();
        if let Some(journal) = &self.journal {
            if let Err(e) = lock_journal(journal)?.close_patient(id, status, now) {
                warn!(patient_id = %id, error = %e, "journal update failed");
                return Err(e.into());
            }
        }

        let previous_position = state.index.position_of(id)?;
        state.index.remove(id)?;
        let record = state
            .records
            .close(id, status, now)
            .map_err(|rejected| rejection(*id, rejected))?
            .clone();

        if status == PatientStatus::Completed {
            state.throughput.record(now);
        }

        info!(
            patient_id = %id,
            status = %status,
            previous_position,
            waiting = state.index.len(),
            "patient left queue"
        );
        Ok(record)
    }

    fn throughput(&self, state: &QueueState, now: DateTime<Utc>) -> f64 {
        state
            .throughput
            .per_minute(now)
            .unwrap_or_else(|| self.estimator.default_throughput())
    }

    fn read(&self) -> ServiceResult<RwLockReadGuard<'_, QueueState>> {
        self.state.read().map_err(|_| {
            error!("queue state lock poisoned");
            ServiceError::LockPoisoned
        })
    }

    fn write(&self) -> ServiceResult<RwLockWriteGuard<'_, QueueState>> {
        self.state.write().map_err(|_| {
            error!("queue state lock poisoned");
            ServiceError::LockPoisoned
        })
    }
}

fn lock_journal(journal: &Mutex<Database>) -> ServiceResult<MutexGuard<'_, Database>> {
    journal.lock().map_err(|_| {
        error!("journal lock poisoned");
        ServiceError::LockPoisoned
    })
}

fn waiting_record<'a>(state: &'a QueueState, id: &PatientId) -> ServiceResult<&'a PatientRecord> {
    match state.records.get(id) {
        Some(record) if record.is_waiting() => Ok(record),
        _ => {
            error!(patient_id = %id, "queued id has no waiting record");
            Err(ServiceError::IndexDesync(*id))
        }
    }
}

fn rejection(id: PatientId, rejected: TransitionRejected) -> ServiceError {
    match rejected {
        TransitionRejected::Unknown => ServiceError::NotFound(id),
        TransitionRejected::Terminal(status) => ServiceError::InvalidTransition { id, status },
    }
}
