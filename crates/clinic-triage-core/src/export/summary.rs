//! Visit summary composed at intake.
//!
//! Composition only; delivery is the caller's concern.

use clinic_triage_llm::{fallback_advisal, with_disclaimer, TriageAssessment};
use serde::{Deserialize, Serialize};

use crate::models::{IntakeReceipt, PatientRecord, WaitingPatient};
use crate::scoring::Tier;

/// Subject line for every visit summary.
pub const SUMMARY_SUBJECT: &str = "Your Visit Summary";

/// Plain-text message for one patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, uniffi::Record)]
pub struct VisitSummary {
    /// Patient email
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl VisitSummary {
    /// Compose from an intake receipt and an assessment, using the keyword advisal.
    pub fn compose(receipt: &IntakeReceipt, assessment: &TriageAssessment) -> Self {
        let advisal = fallback_advisal(&receipt.record.symptoms);
        Self::build(
            &receipt.record,
            receipt.position,
            receipt.estimated_wait,
            assessment,
            &advisal,
        )
    }

    /// Compose for a patient still in the queue, with live position and wait.
    pub fn for_waiting(entry: &WaitingPatient, assessment: &TriageAssessment) -> Self {
        let advisal = fallback_advisal(&entry.record.symptoms);
        Self::build(
            &entry.record,
            entry.position,
            entry.estimated_wait,
            assessment,
            &advisal,
        )
    }

    /// Replace the advisal section with model-generated text plus disclaimer.
    pub fn with_model_advisal(
        receipt: &IntakeReceipt,
        assessment: &TriageAssessment,
        advisal: &str,
    ) -> Self {
        Self::build(
            &receipt.record,
            receipt.position,
            receipt.estimated_wait,
            assessment,
            &with_disclaimer(advisal),
        )
    }

    fn build(
        record: &PatientRecord,
        position: u32,
        estimated_wait: f64,
        assessment: &TriageAssessment,
        advisal: &str,
    ) -> Self {
        let classification = classification(record.tier, assessment);

        let factors = if assessment.priority_factors.is_empty() {
            "none noted".to_string()
        } else {
            assessment.priority_factors.join(", ")
        };

        let body = format!(
            "Thank you for checking in, {name}!\n\
             \n\
             Visit Summary:\n\
             - Purpose: {visit_type}\n\
             - Urgency Level: {urgency}/10\n\
             - Classification: {classification}\n\
             - Estimated Wait Time: {wait} minutes\n\
             - Your Position in Queue: {position}\n\
             \n\
             Analysis:\n\
             {reasoning}\n\
             \n\
             Priority Factors: {factors}\n\
             \n\
             Advisal:\n\
             {advisal}\n",
            name = record.name,
            visit_type = record.visit_type,
            urgency = record.urgency_level,
            classification = title_case(classification),
            wait = estimated_wait.round(),
            position = position,
            reasoning = assessment.reasoning.trim(),
            factors = factors,
            advisal = advisal.trim(),
        );

        Self {
            recipient: record.email.clone(),
            subject: SUMMARY_SUBJECT.to_string(),
            body,
        }
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Classification label for a patient: the assessment's own label when it
/// has one, otherwise the stored tier.
pub fn classification(tier: Tier, assessment: &TriageAssessment) -> &str {
    assessment
        .urgency_classification
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(tier.as_str())
}

fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
