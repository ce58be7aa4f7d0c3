//! Derived queue views. Positions and estimates are computed at read time.

use serde::{Deserialize, Serialize};

use super::patient::{PatientRecord, UrgencyBand};

/// Result of a successful intake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntakeReceipt {
    pub record: PatientRecord,
    /// 1-based rank at the moment of intake
    pub position: u32,
    /// Estimated wait in minutes
    pub estimated_wait: f64,
}

/// One row of the live queue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaitingPatient {
    pub record: PatientRecord,
    pub position: u32,
    pub estimated_wait: f64,
}

/// Waiting counts by self-reported urgency band.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, uniffi::Record)]
pub struct UrgencyBreakdown {
    pub low: u32,
    pub moderate: u32,
    pub high: u32,
}

impl UrgencyBreakdown {
    pub fn count(&mut self, band: UrgencyBand) {
        match band {
            UrgencyBand::Low => self.low += 1,
            UrgencyBand::Moderate => self.moderate += 1,
            UrgencyBand::High => self.high += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.low + self.moderate + self.high
    }
}

/// Aggregate statistics over the Waiting set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_waiting: u32,
    /// Mean estimated wait in minutes; 0 when nobody is waiting
    pub avg_wait_time: f64,
    pub by_urgency: UrgencyBreakdown,
}
