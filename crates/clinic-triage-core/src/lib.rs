//! Clinic Triage Core Library
//!
//! Walk-in clinic intake and priority queue engine.
//!
//! # Architecture
//!
//! ```text
//! IntakeForm → validate → TriageScorer ─┐
//!                                      │
//!                         ┌────────────▼────────────┐
//!                         │   TriageQueueService    │
//!                         │  RecordStore (all ids)  │
//!                         │  QueueIndex (Waiting)   │
//!                         └──┬──────────┬───────────┘
//!                            │          │
//!                            ▼          ▼
//!                     SQLite journal   Reads: positions, wait estimates,
//!                     (optional)       stats, visit summary
//! ```
//!
//! # Core Principle
//!
//! **Positions are never stored.** They are derived from the queue index on
//! every read, so a removal shifts everyone behind it without bookkeeping.
//!
//! # Modules
//!
//! - [`models`]: Domain types (PatientRecord, IntakeForm, queue views)
//! - [`scoring`]: Triage score, tiers, wait estimation, throughput
//! - [`queue`]: Order-statistic index over Waiting patients
//! - [`store`]: Canonical record store
//! - [`service`]: Intake, transitions and reads under one lock
//! - [`db`]: SQLite journal
//! - [`export`]: Visit summary composition
//! - [`config`]: Layered configuration
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod models;
pub mod queue;
pub mod scoring;
pub mod service;
pub mod store;

// Re-export commonly used types
pub use config::{load_config, load_config_from_path, load_config_from_str, TriageConfig};
pub use db::Database;
pub use export::VisitSummary;
pub use models::{
    Contact, IntakeForm, IntakeReceipt, PatientId, PatientRecord, PatientStatus, StatsSnapshot,
    UrgencyBand, UrgencyBreakdown, VisitType, WaitingPatient,
};
pub use queue::{QueueIndex, QueueSnapshot};
pub use scoring::{Tier, TriageScore, TriageScorer, WaitEstimator};
pub use service::{ErrorKind, ServiceError, TriageQueueService};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::Arc;

use clinic_triage_llm::{RuleBasedAssessor, TriageAssessment};
use serde::{Deserialize, Serialize};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum TriageCoreError {
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServiceError> for TriageCoreError {
    fn from(e: ServiceError) -> Self {
        let message = e.to_string();
        match e.kind() {
            ErrorKind::Validation => TriageCoreError::Validation(message),
            ErrorKind::NotFound => TriageCoreError::NotFound(message),
            ErrorKind::Conflict => TriageCoreError::Conflict(message),
            ErrorKind::Internal => TriageCoreError::Internal(message),
        }
    }
}

impl From<config::ConfigError> for TriageCoreError {
    fn from(e: config::ConfigError) -> Self {
        TriageCoreError::Config(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a triage core from TOML configuration.
///
/// Journals to SQLite when `storage.database_path` is set and replays any
/// existing journal.
#[uniffi::export]
pub fn open_triage_core(config_toml: String) -> Result<Arc<TriageCore>, TriageCoreError> {
    let config = load_config_from_str(&config_toml)?;
    let service = TriageQueueService::from_config(&config)?;
    Ok(Arc::new(TriageCore { service }))
}

/// Create an in-memory triage core with default settings.
#[uniffi::export]
pub fn open_triage_core_in_memory() -> Result<Arc<TriageCore>, TriageCoreError> {
    Ok(Arc::new(TriageCore {
        service: TriageQueueService::new(&TriageConfig::default()),
    }))
}

/// Install the global tracing subscriber. Returns false if one was already set.
#[uniffi::export]
pub fn init_logging(level: String) -> bool {
    logging::init_tracing(&level)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe triage queue for FFI.
#[derive(uniffi::Object)]
pub struct TriageCore {
    service: TriageQueueService,
}

#[uniffi::export]
impl TriageCore {
    // =========================================================================
    // Intake
    // =========================================================================

    /// Register a patient. Validation failures carry a human-readable message.
    pub fn create_intake(&self, request: IntakeRequest) -> Result<IntakeResponse, TriageCoreError> {
        let form = IntakeForm::try_from(request)?;
        let receipt = self.service.intake(form)?;
        let assessment = assess(&receipt.record);
        let summary = VisitSummary::compose(&receipt, &assessment);
        let analysis = IntakeAnalysis::new(&receipt.record, assessment);

        let estimated_wait = receipt.estimated_wait;
        Ok(IntakeResponse {
            patient: QueuedPatient::from_parts(receipt.record, receipt.position, estimated_wait),
            estimated_wait,
            analysis,
            summary,
        })
    }

    // =========================================================================
    // Queue Reads
    // =========================================================================

    /// Waiting patients ordered by rank.
    pub fn list_queue(&self) -> Result<QueueListing, TriageCoreError> {
        let patients: Vec<QueuedPatient> = self
            .service
            .list_waiting()?
            .into_iter()
            .map(QueuedPatient::from)
            .collect();
        Ok(QueueListing {
            total: patients.len() as u32,
            patients,
        })
    }

    /// Aggregate statistics over the Waiting set.
    pub fn get_stats(&self) -> Result<QueueStats, TriageCoreError> {
        Ok(self.service.stats()?.into())
    }

    /// Current 1-based position of a Waiting patient.
    pub fn position_of(&self, id: String) -> Result<u32, TriageCoreError> {
        Ok(self.service.position_of(&parse_id(&id)?)?)
    }

    /// Any patient record, including closed ones.
    pub fn get_patient(&self, id: String) -> Result<PatientView, TriageCoreError> {
        Ok(self.service.patient(&parse_id(&id)?)?.into())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Mark a Waiting patient as seen. Terminal records are rejected as a conflict.
    pub fn complete_patient(&self, id: String) -> Result<PatientView, TriageCoreError> {
        Ok(self.service.complete(&parse_id(&id)?)?.into())
    }

    /// Withdraw a Waiting patient. Terminal records are rejected as a conflict.
    pub fn cancel_patient(&self, id: String) -> Result<PatientView, TriageCoreError> {
        Ok(self.service.cancel(&parse_id(&id)?)?.into())
    }

    // =========================================================================
    // Notification
    // =========================================================================

    /// Compose the visit summary for a Waiting patient using the rule-based assessor.
    pub fn visit_summary(&self, id: String) -> Result<VisitSummary, TriageCoreError> {
        let entry = self.service.queue_entry(&parse_id(&id)?)?;
        let assessment = assess(&entry.record);
        Ok(VisitSummary::for_waiting(&entry, &assessment))
    }
}

fn assess(record: &PatientRecord) -> TriageAssessment {
    RuleBasedAssessor.assess(
        u8::try_from(record.urgency_level).unwrap_or(u8::MAX),
        record.visit_type.as_str(),
        record.estimated_duration,
    )
}

fn parse_id(id: &str) -> Result<PatientId, TriageCoreError> {
    id.trim()
        .parse()
        .map_err(|e| TriageCoreError::Validation(format!("Invalid patient id {}: {}", id, e)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// Intake payload. Every field is required; blank strings count as missing.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct IntakeRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub symptoms: String,
    pub urgency_level: u32,
    pub visit_type: String,
    pub estimated_duration: u32,
}

impl TryFrom<IntakeRequest> for IntakeForm {
    type Error = TriageCoreError;

    fn try_from(request: IntakeRequest) -> Result<Self, Self::Error> {
        let raw = request.visit_type.trim();
        if raw.is_empty() {
            return Err(TriageCoreError::Validation(
                "Missing required field: visitType".to_string(),
            ));
        }
        let visit_type: VisitType = raw.parse().map_err(TriageCoreError::Validation)?;

        Ok(IntakeForm {
            contact: Contact::new(request.name, request.email, request.phone),
            symptoms: request.symptoms,
            urgency_level: request.urgency_level,
            visit_type,
            estimated_duration: request.estimated_duration,
        })
    }
}

/// Intake result: the queued patient, their wait estimate in minutes, the
/// rule-based analysis and the visit summary composed at intake time.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub patient: QueuedPatient,
    pub estimated_wait: f64,
    pub analysis: IntakeAnalysis,
    pub summary: VisitSummary,
}

/// Why a patient landed where they did.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct IntakeAnalysis {
    pub urgency_classification: String,
    pub reasoning: String,
    pub priority_factors: Vec<String>,
}

impl IntakeAnalysis {
    fn new(record: &PatientRecord, assessment: TriageAssessment) -> Self {
        Self {
            urgency_classification: export::classification(record.tier, &assessment).to_string(),
            reasoning: assessment.reasoning,
            priority_factors: assessment.priority_factors,
        }
    }
}

/// One row of the queue listing.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct QueuedPatient {
    pub id: String,
    pub position: u32,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub symptoms: String,
    pub urgency_level: u32,
    pub triage_score: u8,
    pub tier: String,
    pub visit_type: String,
    pub estimated_duration: u32,
    pub estimated_wait: f64,
}

impl QueuedPatient {
    fn from_parts(record: PatientRecord, position: u32, estimated_wait: f64) -> Self {
        Self {
            id: record.id.to_string(),
            position,
            name: record.name,
            email: record.email,
            phone: record.phone,
            symptoms: record.symptoms,
            urgency_level: record.urgency_level,
            triage_score: record.triage_score,
            tier: record.tier.as_str().to_string(),
            visit_type: record.visit_type.as_str().to_string(),
            estimated_duration: record.estimated_duration,
            estimated_wait,
        }
    }
}

impl From<WaitingPatient> for QueuedPatient {
    fn from(entry: WaitingPatient) -> Self {
        Self::from_parts(entry.record, entry.position, entry.estimated_wait)
    }
}

/// Queue listing ordered by rank ascending.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct QueueListing {
    pub patients: Vec<QueuedPatient>,
    pub total: u32,
}

/// Queue statistics.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total_waiting: u32,
    pub avg_wait_time: f64,
    pub by_urgency: UrgencyBreakdown,
}

impl From<StatsSnapshot> for QueueStats {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            total_waiting: stats.total_waiting,
            avg_wait_time: stats.avg_wait_time,
            by_urgency: stats.by_urgency,
        }
    }
}

/// Full patient record, any status.
#[derive(Debug, Clone, Serialize, Deserialize, uniffi::Record)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub symptoms: String,
    pub urgency_level: u32,
    pub visit_type: String,
    pub estimated_duration: u32,
    pub triage_score: u8,
    pub tier: String,
    pub status: String,
    pub arrival_sequence: u64,
    pub created_at: String,
    pub closed_at: Option<String>,
}

impl From<PatientRecord> for PatientView {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            email: record.email,
            phone: record.phone,
            symptoms: record.symptoms,
            urgency_level: record.urgency_level,
            visit_type: record.visit_type.as_str().to_string(),
            estimated_duration: record.estimated_duration,
            triage_score: record.triage_score,
            tier: record.tier.as_str().to_string(),
            status: record.status.as_str().to_string(),
            arrival_sequence: record.arrival_sequence,
            created_at: record.created_at.to_rfc3339(),
            closed_at: record.closed_at.map(|t| t.to_rfc3339()),
        }
    }
}
