//! Patient journal operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::{Database, DbError, DbResult};
use crate::models::{PatientId, PatientRecord, PatientStatus};

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, email, phone, symptoms, urgency_level, visit_type,
           estimated_duration, triage_score, tier, status, arrival_sequence,
           created_at, closed_at
    FROM patients
"#;

impl Database {
    /// Insert a newly created patient.
    pub fn insert_patient(&self, record: &PatientRecord) -> DbResult<()> {
        let sequence = i64::try_from(record.arrival_sequence).map_err(|_| {
            DbError::InvalidRow(format!(
                "arrival_sequence out of range: {}",
                record.arrival_sequence
            ))
        })?;

        self.conn.execute(
            r#"
            INSERT INTO patients (
                id, name, email, phone, symptoms, urgency_level, visit_type,
                estimated_duration, triage_score, tier, status, arrival_sequence,
                created_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                record.id.to_string(),
                record.name,
                record.email,
                record.phone,
                record.symptoms,
                record.urgency_level,
                record.visit_type.as_str(),
                record.estimated_duration,
                record.triage_score,
                record.tier.as_str(),
                record.status.as_str(),
                sequence,
                record.created_at.to_rfc3339(),
                record.closed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Move a waiting patient to a terminal status.
    ///
    /// Fails with [`DbError::JournalDesync`] if the journal has no waiting row
    /// for `id`, which means it no longer mirrors the in-memory queue.
    pub fn close_patient(
        &self,
        id: &PatientId,
        status: PatientStatus,
        closed_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let rows_affected = self.conn.execute(
            "UPDATE patients SET status = ?2, closed_at = ?3 WHERE id = ?1 AND status = 'waiting'",
            params![id.to_string(), status.as_str(), closed_at.to_rfc3339()],
        )?;
        if rows_affected == 0 {
            return Err(DbError::JournalDesync(*id));
        }
        Ok(())
    }

    /// Get a patient by id.
    pub fn get_patient(&self, id: &PatientId) -> DbResult<Option<PatientRecord>> {
        self.conn
            .query_row(
                &format!("{} WHERE id = ?", SELECT_COLUMNS),
                [id.to_string()],
                PatientRow::from_row,
            )
            .optional()?
            .map(PatientRecord::try_from)
            .transpose()
    }

    /// List every patient ordered by arrival.
    pub fn list_patients(&self) -> DbResult<Vec<PatientRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{} ORDER BY arrival_sequence", SELECT_COLUMNS))?;
        let rows = stmt.query_map([], PatientRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.try_into()?);
        }
        Ok(records)
    }

    /// Count patients with a given status.
    pub fn count_patients_by_status(&self, status: PatientStatus) -> DbResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM patients WHERE status = ?",
            [status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Intermediate row struct for database mapping.
struct PatientRow {
    id: String,
    name: String,
    email: String,
    phone: String,
    symptoms: String,
    urgency_level: u32,
    visit_type: String,
    estimated_duration: u32,
    triage_score: u8,
    tier: String,
    status: String,
    arrival_sequence: i64,
    created_at: String,
    closed_at: Option<String>,
}

impl PatientRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
            symptoms: row.get(4)?,
            urgency_level: row.get(5)?,
            visit_type: row.get(6)?,
            estimated_duration: row.get(7)?,
            triage_score: row.get(8)?,
            tier: row.get(9)?,
            status: row.get(10)?,
            arrival_sequence: row.get(11)?,
            created_at: row.get(12)?,
            closed_at: row.get(13)?,
        })
    }
}

impl TryFrom<PatientRow> for PatientRecord {
    type Error = DbError;

    fn try_from(row: PatientRow) -> Result<Self, Self::Error> {
        let id = row
            .id
            .parse()
            .map_err(|e| DbError::InvalidRow(format!("Invalid patient id {}: {}", row.id, e)))?;
        let arrival_sequence = u64::try_from(row.arrival_sequence).map_err(|_| {
            DbError::InvalidRow(format!("Negative arrival_sequence: {}", row.arrival_sequence))
        })?;

        Ok(PatientRecord {
            id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            symptoms: row.symptoms,
            urgency_level: row.urgency_level,
            visit_type: row.visit_type.parse().map_err(DbError::InvalidRow)?,
            estimated_duration: row.estimated_duration,
            triage_score: row.triage_score,
            tier: row.tier.parse().map_err(DbError::InvalidRow)?,
            status: row.status.parse().map_err(DbError::InvalidRow)?,
            arrival_sequence,
            created_at: parse_timestamp(&row.created_at)?,
            closed_at: row.closed_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

fn parse_timestamp(value: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DbError::InvalidRow(format!("Invalid timestamp {}: {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitType;
    use crate::scoring::Tier;

    fn make_record(sequence: u64) -> PatientRecord {
        PatientRecord {
            id: PatientId::new(),
            name: "Jordan Reyes".into(),
            email: "jordan@example.com".into(),
            phone: "555-0142".into(),
            symptoms: "Migraine with aura".into(),
            urgency_level: 6,
            visit_type: VisitType::Urgent,
            estimated_duration: 20,
            triage_score: 60,
            tier: Tier::Urgent,
            status: PatientStatus::Waiting,
            arrival_sequence: sequence,
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let record = make_record(1);
        db.insert_patient(&record).unwrap();

        let retrieved = db.get_patient(&record.id).unwrap().unwrap();
        assert_eq!(retrieved.id, record.id);
        assert_eq!(retrieved.visit_type, VisitType::Urgent);
        assert_eq!(retrieved.tier, Tier::Urgent);
        assert_eq!(retrieved.triage_score, 60);
        assert_eq!(retrieved.status, PatientStatus::Waiting);
        assert_eq!(retrieved.created_at.timestamp(), record.created_at.timestamp());
        assert!(retrieved.closed_at.is_none());

        assert!(db.get_patient(&PatientId::new()).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_sequence_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.insert_patient(&make_record(1)).unwrap();
        assert!(db.insert_patient(&make_record(1)).is_err());
    }

    #[test]
    fn test_close_only_waiting() {
        let db = Database::open_in_memory().unwrap();
        let record = make_record(1);
        db.insert_patient(&record).unwrap();

        db.close_patient(&record.id, PatientStatus::Completed, Utc::now())
            .unwrap();
        assert!(matches!(
            db.close_patient(&record.id, PatientStatus::Cancelled, Utc::now()),
            Err(DbError::JournalDesync(id)) if id == record.id
        ));
        assert!(matches!(
            db.close_patient(&PatientId::new(), PatientStatus::Cancelled, Utc::now()),
            Err(DbError::JournalDesync(_))
        ));

        let retrieved = db.get_patient(&record.id).unwrap().unwrap();
        assert_eq!(retrieved.status, PatientStatus::Completed);
        assert!(retrieved.closed_at.is_some());
        assert_eq!(db.count_patients_by_status(PatientStatus::Completed).unwrap(), 1);
        assert_eq!(db.count_patients_by_status(PatientStatus::Waiting).unwrap(), 0);
    }

    #[test]
    fn test_list_by_arrival() {
        let db = Database::open_in_memory().unwrap();
        for sequence in [5, 2, 9] {
            db.insert_patient(&make_record(sequence)).unwrap();
        }

        let sequences: Vec<_> = db
            .list_patients()
            .unwrap()
            .iter()
            .map(|r| r.arrival_sequence)
            .collect();
        assert_eq!(sequences, vec![2, 5, 9]);
    }
}
