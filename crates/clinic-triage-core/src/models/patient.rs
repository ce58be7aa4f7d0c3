//! Patient models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::Tier;

/// Unique, immutable patient identifier generated at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(Uuid);

impl PatientId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PatientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Category of visit selected on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitType {
    Emergency,
    Urgent,
    FollowUp,
    NewVisit,
    Advisal,
}

impl VisitType {
    /// Canonical wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitType::Emergency => "emergency",
            VisitType::Urgent => "urgent",
            VisitType::FollowUp => "follow-up",
            VisitType::NewVisit => "new-visit",
            VisitType::Advisal => "advisal",
        }
    }
}

impl fmt::Display for VisitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "emergency" => Ok(VisitType::Emergency),
            "urgent" => Ok(VisitType::Urgent),
            "follow-up" | "follow up" | "followup" | "follow_up" => Ok(VisitType::FollowUp),
            "new-visit" | "new visit" | "new_visit" | "new" => Ok(VisitType::NewVisit),
            "advisal" => Ok(VisitType::Advisal),
            other => Err(format!("Unknown visit type: {}", other)),
        }
    }
}

/// Lifecycle status. Completed and Cancelled are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    Waiting,
    Completed,
    Cancelled,
}

impl PatientStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PatientStatus::Waiting)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatientStatus::Waiting => "waiting",
            PatientStatus::Completed => "completed",
            PatientStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(PatientStatus::Waiting),
            "completed" => Ok(PatientStatus::Completed),
            "cancelled" => Ok(PatientStatus::Cancelled),
            other => Err(format!("Unknown patient status: {}", other)),
        }
    }
}

/// Coarse grouping of self-reported urgency used by queue statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyBand {
    /// Urgency 1-3
    Low,
    /// Urgency 4-7
    Moderate,
    /// Urgency 8-10
    High,
}

impl UrgencyBand {
    pub fn from_level(urgency_level: u32) -> Self {
        match urgency_level {
            0..=3 => UrgencyBand::Low,
            4..=7 => UrgencyBand::Moderate,
            _ => UrgencyBand::High,
        }
    }
}

/// Canonical state of one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientRecord {
    pub id: PatientId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Visit purpose and symptom description
    pub symptoms: String,
    /// Self-reported urgency, 1-10
    pub urgency_level: u32,
    pub visit_type: VisitType,
    /// Self-reported visit length in minutes, 10-60
    pub estimated_duration: u32,
    /// Derived priority, 0-100; fixed at creation
    pub triage_score: u8,
    pub tier: Tier,
    pub status: PatientStatus,
    /// Tie-break counter; strictly increasing across all records
    pub arrival_sequence: u64,
    pub created_at: DateTime<Utc>,
    /// Set on completion or cancellation
    pub closed_at: Option<DateTime<Utc>>,
}

impl PatientRecord {
    pub fn is_waiting(&self) -> bool {
        self.status == PatientStatus::Waiting
    }

    pub fn urgency_band(&self) -> UrgencyBand {
        UrgencyBand::from_level(self.urgency_level)
    }
}
