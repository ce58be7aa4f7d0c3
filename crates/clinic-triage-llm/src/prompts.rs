//! Prompts for triage assessment and patient advisal.

/// Appended to every model-generated advisal before it reaches a patient.
pub const ADVISAL_DISCLAIMER: &str = "This advisal does not constitute medical advice. \
Please consult with a healthcare professional for proper diagnosis and treatment.";

/// System prompt for triage assessment.
pub const SYSTEM_PROMPT: &str = r#"You are a medical triage assistant for a walk-in clinic.

You receive a patient's self-reported intake and return a structured assessment.
Higher scores indicate higher priority. Consider symptom severity, potential for
deterioration, and medical urgency.

Classification bands:
- critical (80-100): life-threatening, immediate attention needed
- urgent (60-79): serious but not immediately life-threatening
- moderate (40-59): requires attention but can wait
- routine (20-39): standard care, can wait longer
- low (0-19): consultation or minor issues

Output a single JSON object and nothing else."#;

/// User prompt for a triage assessment.
pub fn make_assessment_prompt(
    symptoms: &str,
    urgency_level: u8,
    visit_type: &str,
    estimated_duration: u32,
) -> String {
    format!(
        r#"Assess the following patient intake:

- Symptoms: {}
- Self-reported urgency level: {}/10
- Visit type: {}
- Estimated duration: {} minutes

Return a JSON object with:
- triage_score: number between 0 and 100
- urgency_classification: one of "low", "routine", "moderate", "urgent", "critical"
- reasoning: brief explanation of the triage decision
- priority_factors: array of up to three short strings"#,
        symptoms.trim(),
        urgency_level,
        visit_type,
        estimated_duration
    )
}

/// User prompt for a short patient-facing advisal message.
pub fn make_advisal_prompt(symptoms: &str, visit_type: &str, classification: &str) -> String {
    format!(
        r#"Write a short advisal message for a patient waiting to be seen.

- Symptoms: {}
- Visit type: {}
- Urgency classification: {}

The message should acknowledge the symptoms, give general self-care
recommendations, say when to seek immediate medical attention, and be
encouraging. Keep it to 2-3 sentences, professional but warm."#,
        symptoms.trim(),
        visit_type,
        classification
    )
}

/// Build a complete chat-formatted prompt for an assessment request.
pub fn build_full_prompt(
    symptoms: &str,
    urgency_level: u8,
    visit_type: &str,
    estimated_duration: u32,
) -> String {
    let mut prompt = String::new();

    prompt.push_str("<|system|>\n");
    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n<|end|>\n");

    prompt.push_str("<|user|>\n");
    prompt.push_str(&make_assessment_prompt(
        symptoms,
        urgency_level,
        visit_type,
        estimated_duration,
    ));
    prompt.push_str("\n<|end|>\n");
    prompt.push_str("<|assistant|>\n");

    prompt
}

/// Append the disclaimer to model-generated advisal text.
pub fn with_disclaimer(advisal: &str) -> String {
    format!("{}\n\n{}", advisal.trim(), ADVISAL_DISCLAIMER)
}
