//! Journal replay and foreign-callable facade tests.

use clinic_triage_core::config::TriageConfig;
use clinic_triage_core::db::Database;
use clinic_triage_core::models::{Contact, IntakeForm, PatientStatus, VisitType};
use clinic_triage_core::service::TriageQueueService;
use clinic_triage_core::{
    open_triage_core, open_triage_core_in_memory, IntakeRequest, TriageCoreError,
};

fn make_form(name: &str, urgency_level: u32) -> IntakeForm {
    IntakeForm {
        contact: Contact::new(name, format!("{}@example.com", name.to_lowercase()), "555-0123"),
        symptoms: "Persistent cough".to_string(),
        urgency_level,
        visit_type: VisitType::NewVisit,
        estimated_duration: 20,
    }
}

fn journal_config(path: &std::path::Path) -> TriageConfig {
    let mut config = TriageConfig::default();
    config.storage.database_path = Some(path.to_string_lossy().into_owned());
    config
}

fn make_request(name: &str, urgency_level: u32, visit_type: &str) -> IntakeRequest {
    IntakeRequest {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "555-0188".to_string(),
        symptoms: "Fever and chills".to_string(),
        urgency_level,
        visit_type: visit_type.to_string(),
        estimated_duration: 15,
    }
}

#[test]
fn test_restore_rebuilds_queue() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("triage.db");
    let config = journal_config(&path);

    let (kept, completed, cancelled) = {
        let service = TriageQueueService::from_config(&config).unwrap();
        let kept = service.intake(make_form("Kept", 4)).unwrap().record.id;
        let completed = service.intake(make_form("Seen", 9)).unwrap().record.id;
        let cancelled = service.intake(make_form("Left", 6)).unwrap().record.id;
        service.complete(&completed).unwrap();
        service.cancel(&cancelled).unwrap();
        (kept, completed, cancelled)
    };

    let service = TriageQueueService::from_config(&config).unwrap();
    assert_eq!(service.records().unwrap().len(), 3);
    assert_eq!(service.position_of(&kept).unwrap(), 1);
    assert_eq!(service.patient(&completed).unwrap().status, PatientStatus::Completed);
    assert_eq!(service.patient(&cancelled).unwrap().status, PatientStatus::Cancelled);
    assert!(service.cancel(&completed).is_err());

    // Sequence continues past the highest journaled value
    let next = service.intake(make_form("Next", 4)).unwrap();
    assert_eq!(next.record.arrival_sequence, 4);
    assert_eq!(next.position, 2);
}

#[test]
fn test_restore_preserves_tie_order() {
    let db_dir = tempfile::tempdir().unwrap();
    let path = db_dir.path().join("ties.db");
    let config = journal_config(&path);

    let expected: Vec<_> = {
        let service = TriageQueueService::from_config(&config).unwrap();
        for name in ["First", "Second", "Third"] {
            service.intake(make_form(name, 5)).unwrap();
        }
        service.snapshot().unwrap().iter().copied().collect()
    };

    let service = TriageQueueService::from_config(&config).unwrap();
    let restored: Vec<_> = service.snapshot().unwrap().iter().copied().collect();
    assert_eq!(restored, expected);
}

#[test]
fn test_journal_matches_memory() {
    let db = Database::open_in_memory().unwrap();
    let service = TriageQueueService::restore(&TriageConfig::default(), db).unwrap();
    let id = service.intake(make_form("Mia", 7)).unwrap().record.id;
    service.complete(&id).unwrap();

    let in_memory = service.patient(&id).unwrap();
    assert_eq!(in_memory.status, PatientStatus::Completed);
    assert!(in_memory.closed_at.is_some());
}

#[test]
fn test_facade_intake_and_listing() {
    let core = open_triage_core_in_memory().unwrap();

    let low = core.create_intake(make_request("Low", 2, "new visit")).unwrap();
    let high = core.create_intake(make_request("High", 9, "emergency")).unwrap();
    assert_eq!(low.patient.position, 1);
    assert_eq!(high.patient.position, 1);
    assert_eq!(high.patient.tier, "critical");
    assert_eq!(high.estimated_wait, 0.0);

    let listing = core.list_queue().unwrap();
    assert_eq!(listing.total, 2);
    assert_eq!(listing.patients[0].name, "High");
    assert_eq!(listing.patients[1].position, 2);

    let json = serde_json::to_value(&listing.patients[1]).unwrap();
    assert_eq!(json["urgencyLevel"], 2);
    assert_eq!(json["visitType"], "new-visit");
    assert!(json.get("estimatedDuration").is_some());
}

#[test]
fn test_facade_requires_visit_type() {
    let core = open_triage_core_in_memory().unwrap();

    let err = core.create_intake(make_request("Ned", 5, "  ")).unwrap_err();
    assert!(matches!(
        err,
        TriageCoreError::Validation(ref m) if m == "Missing required field: visitType"
    ));
    assert_eq!(core.list_queue().unwrap().total, 0);

    // Absent from the JSON payload is a deserialization failure
    let payload = serde_json::json!({
        "name": "Ned",
        "email": "ned@example.com",
        "phone": "555-0188",
        "symptoms": "Fever",
        "urgencyLevel": 5,
        "estimatedDuration": 15
    });
    assert!(serde_json::from_value::<IntakeRequest>(payload).is_err());

    let response = core.create_intake(make_request("Ned", 5, "follow up")).unwrap();
    assert_eq!(response.patient.visit_type, "follow-up");
}

#[test]
fn test_facade_intake_returns_analysis_and_summary() {
    let core = open_triage_core_in_memory().unwrap();
    core.create_intake(make_request("Ahead", 10, "emergency")).unwrap();
    let response = core.create_intake(make_request("Cy", 6, "new visit")).unwrap();

    assert_eq!(response.patient.position, 2);
    assert_eq!(response.analysis.reasoning, "Rule-based calculation used");
    assert_eq!(response.analysis.urgency_classification, response.patient.tier);
    assert!(!response.analysis.priority_factors.is_empty());

    assert_eq!(response.summary.recipient, "cy@example.com");
    assert!(response.summary.body.contains("- Your Position in Queue: 2"));
    assert!(response.summary.body.contains("- Classification: Urgent"));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["analysis"]["urgencyClassification"], "urgent");
    assert!(json["analysis"]["priorityFactors"].is_array());
    assert!(json["summary"]["subject"].is_string());

    // The intake-time summary survives the patient leaving the queue
    core.complete_patient(response.patient.id.clone()).unwrap();
    assert!(response.summary.body.contains("- Your Position in Queue: 2"));
    assert!(matches!(
        core.visit_summary(response.patient.id),
        Err(TriageCoreError::NotFound(_))
    ));
}

#[test]
fn test_facade_error_mapping() {
    let core = open_triage_core_in_memory().unwrap();

    let err = core
        .create_intake(make_request("Bad", 0, "follow-up"))
        .unwrap_err();
    assert!(matches!(err, TriageCoreError::Validation(ref m) if m.contains("urgencyLevel")));

    let err = core
        .create_intake(make_request("Bad", 5, "house call"))
        .unwrap_err();
    assert!(matches!(err, TriageCoreError::Validation(_)));

    assert!(matches!(
        core.complete_patient("not-a-uuid".to_string()),
        Err(TriageCoreError::Validation(_))
    ));
    assert!(matches!(
        core.cancel_patient(uuid::Uuid::new_v4().to_string()),
        Err(TriageCoreError::NotFound(_))
    ));

    let id = core.create_intake(make_request("Ok", 5, "follow-up")).unwrap().patient.id;
    let closed = core.complete_patient(id.clone()).unwrap();
    assert_eq!(closed.status, "completed");
    assert!(closed.closed_at.is_some());
    assert!(matches!(
        core.cancel_patient(id.clone()),
        Err(TriageCoreError::Conflict(_))
    ));
    assert!(matches!(core.position_of(id), Err(TriageCoreError::NotFound(_))));
}

#[test]
fn test_facade_stats_and_summary() {
    let core = open_triage_core_in_memory().unwrap();
    let first = core.create_intake(make_request("Ava", 9, "urgent")).unwrap();
    let second = core.create_intake(make_request("Bo", 4, "follow-up")).unwrap();
    // Urgent visits carry no visit-type offset: 90 + 5 for a short visit
    assert_eq!(first.patient.triage_score, 95);
    assert_eq!(second.patient.triage_score, 65);

    let stats = core.get_stats().unwrap();
    assert_eq!(stats.total_waiting, 2);
    assert_eq!(stats.by_urgency.high, 1);
    assert_eq!(stats.by_urgency.moderate, 1);
    assert!((stats.avg_wait_time - 15.0).abs() < 1e-9);

    let summary = core.visit_summary(second.patient.id.clone()).unwrap();
    assert_eq!(summary.recipient, "bo@example.com");
    assert!(summary.body.contains("- Your Position in Queue: 2"));
    assert!(summary.body.contains("For fever"));

    core.cancel_patient(first.patient.id).unwrap();
    let summary = core.visit_summary(second.patient.id.clone()).unwrap();
    assert!(summary.body.contains("- Your Position in Queue: 1"));

    let view = core.get_patient(second.patient.id).unwrap();
    assert_eq!(view.name, "Bo");
    assert_eq!(view.status, "waiting");
}

#[test]
fn test_facade_open_with_journal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facade.db");
    let toml = format!(
        "[storage]\ndatabase_path = '{}'\n\n[queue]\ndefault_service_minutes = 10.0\n",
        path.display()
    );

    let id = {
        let core = open_triage_core(toml.clone()).unwrap();
        core.create_intake(make_request("Zed", 3, "follow-up")).unwrap();
        core.create_intake(make_request("Yu", 8, "follow-up")).unwrap().patient.id
    };

    let core = open_triage_core(toml).unwrap();
    assert_eq!(core.position_of(id).unwrap(), 1);
    let listing = core.list_queue().unwrap();
    assert_eq!(listing.total, 2);
    assert!((listing.patients[1].estimated_wait - 10.0).abs() < 1e-9);
}

#[test]
fn test_facade_rejects_bad_config() {
    let err = open_triage_core("[queue]\ndefault_service_minutes = -1.0\n".to_string())
        .err()
        .unwrap();
    assert!(matches!(err, TriageCoreError::Config(_)));
}
