//! SQLite schema definition.

/// Version stamped into `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

/// Complete journal schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients (one row per intake, never deleted)
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    phone TEXT NOT NULL,
    symptoms TEXT NOT NULL,
    urgency_level INTEGER NOT NULL CHECK (urgency_level BETWEEN 1 AND 10),
    visit_type TEXT NOT NULL,
    estimated_duration INTEGER NOT NULL CHECK (estimated_duration BETWEEN 10 AND 60),
    triage_score INTEGER NOT NULL CHECK (triage_score BETWEEN 0 AND 100),
    tier TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'waiting'
        CHECK (status IN ('waiting', 'completed', 'cancelled')),
    arrival_sequence INTEGER NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    closed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_patients_status ON patients(status);
"#;
