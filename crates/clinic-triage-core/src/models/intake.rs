//! Intake submission models.

use serde::{Deserialize, Serialize};

use super::patient::VisitType;

/// Accepted range for self-reported urgency.
pub const URGENCY_RANGE: std::ops::RangeInclusive<u32> = 1..=10;

/// Accepted range for self-reported visit duration, in minutes.
pub const DURATION_RANGE: std::ops::RangeInclusive<u32> = 10..=60;

/// Contact identity submitted with an intake.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, email: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }
}

/// A patient intake as submitted by the form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntakeForm {
    pub contact: Contact,
    pub symptoms: String,
    pub urgency_level: u32,
    pub visit_type: VisitType,
    pub estimated_duration: u32,
}

impl IntakeForm {
    /// Check required fields and numeric ranges.
    ///
    /// Returns a human-readable message naming the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("name", &self.contact.name),
            ("email", &self.contact.email),
            ("phone", &self.contact.phone),
            ("symptoms", &self.symptoms),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("Missing required field: {}", field));
            }
        }

        if !self.contact.email.contains('@') {
            return Err(format!("Invalid email address: {}", self.contact.email.trim()));
        }

        if !URGENCY_RANGE.contains(&self.urgency_level) {
            return Err(format!(
                "urgencyLevel must be between {} and {}, got {}",
                URGENCY_RANGE.start(),
                URGENCY_RANGE.end(),
                self.urgency_level
            ));
        }

        if !DURATION_RANGE.contains(&self.estimated_duration) {
            return Err(format!(
                "estimatedDuration must be between {} and {} minutes, got {}",
                DURATION_RANGE.start(),
                DURATION_RANGE.end(),
                self.estimated_duration
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_form() -> IntakeForm {
        IntakeForm {
            contact: Contact::new("Ada Park", "ada@example.com", "555-0101"),
            symptoms: "Follow-up for sprained ankle".into(),
            urgency_level: 5,
            visit_type: VisitType::FollowUp,
            estimated_duration: 30,
        }
    }

    #[test]
    fn test_valid_form() {
        assert!(make_form().validate().is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let mut form = make_form();
        form.contact.name = "   ".into();
        assert_eq!(form.validate().unwrap_err(), "Missing required field: name");

        let mut form = make_form();
        form.symptoms = String::new();
        assert_eq!(form.validate().unwrap_err(), "Missing required field: symptoms");
    }

    #[test]
    fn test_invalid_email() {
        let mut form = make_form();
        form.contact.email = "ada.example.com".into();
        assert!(form.validate().unwrap_err().contains("Invalid email"));
    }

    #[test]
    fn test_range_bounds() {
        for (urgency, ok) in [(0, false), (1, true), (10, true), (11, false)] {
            let mut form = make_form();
            form.urgency_level = urgency;
            assert_eq!(form.validate().is_ok(), ok, "urgency {}", urgency);
        }

        for (duration, ok) in [(9, false), (10, true), (60, true), (61, false)] {
            let mut form = make_form();
            form.estimated_duration = duration;
            assert_eq!(form.validate().is_ok(), ok, "duration {}", duration);
        }
    }
}
