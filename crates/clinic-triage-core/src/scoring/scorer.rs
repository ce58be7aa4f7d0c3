//! Deterministic triage scoring.
//!
//! Score components:
//! - Self-reported urgency: 10 points per level
//! - Visit type: emergency +50, follow-up +20, advisal -10, anything else 0
//! - Short visits (15 minutes or less): +5
//!
//! The sum is clamped to 0-100.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::VisitType;

/// Upper bound of the triage score.
pub const MAX_SCORE: u8 = 100;

/// Points per self-reported urgency level.
const URGENCY_WEIGHT: i64 = 10;

/// Visits at or under this many minutes get a small boost.
const SHORT_VISIT_MINUTES: u32 = 15;

const SHORT_VISIT_BONUS: i64 = 5;

/// Severity tier derived from the triage score by fixed cut points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Routine,
    Moderate,
    Urgent,
    Critical,
}

impl Tier {
    /// Map a score to its tier. Lower bounds are inclusive.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Tier::Critical,
            60..=79 => Tier::Urgent,
            40..=59 => Tier::Moderate,
            20..=39 => Tier::Routine,
            _ => Tier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Routine => "routine",
            Tier::Moderate => "moderate",
            Tier::Urgent => "urgent",
            Tier::Critical => "critical",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Tier::Low),
            "routine" => Ok(Tier::Routine),
            "moderate" => Ok(Tier::Moderate),
            "urgent" => Ok(Tier::Urgent),
            "critical" => Ok(Tier::Critical),
            other => Err(format!("Unknown tier: {}", other)),
        }
    }
}

/// A computed triage score and its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageScore {
    pub value: u8,
    pub tier: Tier,
}

/// Pure scoring function over intake attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriageScorer;

impl TriageScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score an intake. Non-decreasing in `urgency_level`.
    pub fn score(
        &self,
        urgency_level: u32,
        visit_type: VisitType,
        estimated_duration: u32,
    ) -> TriageScore {
        let mut raw = i64::from(urgency_level) * URGENCY_WEIGHT;
        raw += visit_type_adjustment(visit_type);
        if estimated_duration <= SHORT_VISIT_MINUTES {
            raw += SHORT_VISIT_BONUS;
        }

        let value = raw.clamp(0, i64::from(MAX_SCORE)) as u8;
        TriageScore {
            value,
            tier: Tier::from_score(value),
        }
    }
}

fn visit_type_adjustment(visit_type: VisitType) -> i64 {
    match visit_type {
        VisitType::Emergency => 50,
        VisitType::FollowUp => 20,
        VisitType::Advisal => -10,
        VisitType::Urgent | VisitType::NewVisit => 0,
    }
}
