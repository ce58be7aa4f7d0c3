//! Triage assessment extraction from model output, with a rule-based fallback.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Extraction errors.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;

/// Structured triage assessment.
///
/// Produced either by parsing model output or by [`RuleBasedAssessor`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TriageAssessment {
    /// Score suggested by the model; advisory only
    #[serde(default)]
    pub triage_score: Option<f64>,
    /// Classification label suggested by the model
    #[serde(default)]
    pub urgency_classification: Option<String>,
    /// Short explanation of the assessment
    #[serde(default)]
    pub reasoning: String,
    /// Factors that drove the assessment
    #[serde(default)]
    pub priority_factors: Vec<String>,
}

/// Parse model output into a structured assessment.
///
/// Accepts a fenced ```json block, a bare fenced block, or a JSON object
/// embedded in surrounding prose.
pub fn parse_assessment_output(output: &str) -> ExtractionResult<TriageAssessment> {
    let body = strip_code_fence(output);

    let json_start = body.find('{').ok_or_else(|| {
        ExtractionError::InvalidFormat("No JSON object found in response".into())
    })?;
    let json_end = body.rfind('}').ok_or_else(|| {
        ExtractionError::InvalidFormat("No closing brace found in response".into())
    })?;
    if json_end < json_start {
        return Err(ExtractionError::InvalidFormat(
            "Closing brace precedes opening brace".into(),
        ));
    }

    let assessment: TriageAssessment = serde_json::from_str(&body[json_start..=json_end])?;
    Ok(assessment)
}

fn strip_code_fence(output: &str) -> &str {
    if let Some((_, rest)) = output.split_once("```json") {
        return rest.split_once("```").map_or(rest, |(inner, _)| inner).trim();
    }
    if let Some((_, rest)) = output.split_once("```") {
        return rest.split_once("```").map_or(rest, |(inner, _)| inner).trim();
    }
    output
}

/// Deterministic assessor used when no model is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedAssessor;

impl RuleBasedAssessor {
    /// Assess an intake from its self-reported attributes.
    pub fn assess(
        &self,
        urgency_level: u8,
        visit_type: &str,
        estimated_duration: u32,
    ) -> TriageAssessment {
        let mut priority_factors = vec![
            format!("self-reported urgency {}/10", urgency_level),
            format!("visit type: {}", visit_type),
        ];
        if estimated_duration <= 15 {
            priority_factors.push("short visit".to_string());
        }

        TriageAssessment {
            triage_score: None,
            urgency_classification: None,
            reasoning: "Rule-based calculation used".to_string(),
            priority_factors,
        }
    }
}

/// Keyword-driven advisal used when no model is available.
pub fn fallback_advisal(symptoms: &str) -> String {
    let lower = symptoms.trim().to_lowercase();

    let message = if lower.is_empty() {
        "Please continue monitoring your condition and follow up with the doctor as scheduled."
    } else if lower.contains("fever") {
        "For fever, ensure adequate rest and hydration. Monitor temperature regularly and seek \
         immediate care if it exceeds 104°F or persists beyond 3 days."
    } else if lower.contains("pain") {
        "For pain management, avoid any strenuous activity that may exacerbate symptoms. Apply \
         ice if applicable (15 minutes on, 15 minutes off) and monitor for changes."
    } else if lower.contains("cough") || lower.contains("cold") {
        "Rest and hydration are key for respiratory symptoms. Use steam inhalation and monitor \
         for difficulty breathing."
    } else {
        "Please monitor your symptoms carefully and report any significant changes to your \
         healthcare provider."
    };

    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_bare_json() {
        let json = r#"{"triage_score":72,"urgency_classification":"urgent","reasoning":"High fever","priority_factors":["fever","age"]}"#;

        let assessment = parse_assessment_output(json).unwrap();
        assert_eq!(assessment.triage_score, Some(72.0));
        assert_eq!(assessment.urgency_classification.as_deref(), Some("urgent"));
        assert_eq!(assessment.priority_factors.len(), 2);
    }

    #[test]
    fn test_parse_fenced_json() {
        let output = "Here is my assessment:\n```json\n{\"reasoning\":\"Minor cut\",\"triage_score\":15}\n```\nLet me know.";

        let assessment = parse_assessment_output(output).unwrap();
        assert_eq!(assessment.reasoning, "Minor cut");
        assert_eq!(assessment.triage_score, Some(15.0));
        assert!(assessment.priority_factors.is_empty());
    }

    #[test]
    fn test_parse_plain_fence() {
        let output = "```\n{\"reasoning\":\"ok\"}\n```";
        let assessment = parse_assessment_output(output).unwrap();
        assert_eq!(assessment.reasoning, "ok");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_assessment_output("no structured output"),
            Err(ExtractionError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_assessment_output("} backwards {"),
            Err(ExtractionError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_assessment_output("{not json}"),
            Err(ExtractionError::JsonParse(_))
        ));
    }

    #[test]
    fn test_rule_based_assessor() {
        let assessment = RuleBasedAssessor.assess(8, "urgent", 10);
        assert_eq!(assessment.triage_score, None);
        assert_eq!(assessment.reasoning, "Rule-based calculation used");
        assert_eq!(
            assessment.priority_factors,
            vec![
                "self-reported urgency 8/10".to_string(),
                "visit type: urgent".to_string(),
                "short visit".to_string(),
            ]
        );

        let assessment = RuleBasedAssessor.assess(3, "follow-up", 30);
        assert_eq!(assessment.priority_factors.len(), 2);
    }

    #[test]
    fn test_fallback_advisal_keywords() {
        assert!(fallback_advisal("").contains("follow up with the doctor"));
        assert!(fallback_advisal("High FEVER since Monday").contains("104°F"));
        assert!(fallback_advisal("back pain").contains("strenuous activity"));
        assert!(fallback_advisal("dry cough").contains("steam inhalation"));
        assert!(fallback_advisal("head cold").contains("steam inhalation"));
        assert!(fallback_advisal("rash").contains("report any significant changes"));
    }

    proptest! {
        #[test]
        fn parse_never_panics(output in ".*") {
            let _ = parse_assessment_output(&output);
        }
    }
}
