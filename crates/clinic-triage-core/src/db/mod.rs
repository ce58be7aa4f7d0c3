//! SQLite journal of patient records.
//!
//! The in-memory store is authoritative while the service runs; the journal
//! keeps every record for audit and lets a restarted service rebuild its queue.

mod patients;
mod schema;

pub use schema::*;

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

use crate::models::PatientId;

/// Journal errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Journal row is invalid: {0}")]
    InvalidRow(String),

    #[error("Journal has no waiting row for patient {0}")]
    JournalDesync(PatientId),

    #[error("Journal schema version {found} is newer than supported version {supported}")]
    UnsupportedSchema { found: i64, supported: i64 },
}

pub type DbResult<T> = Result<T, DbError>;

/// Journal connection.
pub struct Database {
    conn: Connection,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open a file-backed journal in WAL mode, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Self::with_connection(conn)
    }

    /// Journal that lives only as long as this value.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> DbResult<Self> {
        let found: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        if found > SCHEMA_VERSION {
            return Err(DbError::UnsupportedSchema {
                found,
                supported: SCHEMA_VERSION,
            });
        }

        conn.execute_batch(SCHEMA)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        Ok(Self { conn })
    }

    /// Schema version recorded in the journal file.
    pub fn schema_version(&self) -> DbResult<i64> {
        Ok(self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_journal_is_stamped() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_reopen_file_journal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("journal.db");

        Database::open(&path).unwrap();
        let db = Database::open(&path).unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);

        let mode: String = db
            .conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }

    #[test]
    fn test_newer_schema_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.pragma_update(None, "user_version", SCHEMA_VERSION + 1)
                .unwrap();
        }

        match Database::open(&path) {
            Err(DbError::UnsupportedSchema { found, supported }) => {
                assert_eq!(found, SCHEMA_VERSION + 1);
                assert_eq!(supported, SCHEMA_VERSION);
            }
            other => panic!("expected schema rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_check_constraints_reject_out_of_range_rows() {
        let db = Database::open_in_memory().unwrap();
        let insert = |urgency: i64, duration: i64, score: i64, status: &str, sequence: i64| {
            db.conn.execute(
                r#"
                INSERT INTO patients (
                    id, name, email, phone, symptoms, urgency_level, visit_type,
                    estimated_duration, triage_score, tier, status, arrival_sequence,
                    created_at
                ) VALUES (?1, 'n', 'e@x', 'p', 's', ?2, 'urgent', ?3, ?4, 'low', ?5, ?6,
                          '2026-01-01T00:00:00Z')
                "#,
                rusqlite::params![
                    PatientId::new().to_string(),
                    urgency,
                    duration,
                    score,
                    status,
                    sequence
                ],
            )
        };

        assert!(insert(5, 30, 50, "waiting", 1).is_ok());
        assert!(insert(11, 30, 50, "waiting", 2).is_err());
        assert!(insert(0, 30, 50, "waiting", 3).is_err());
        assert!(insert(5, 9, 50, "waiting", 4).is_err());
        assert!(insert(5, 61, 50, "waiting", 5).is_err());
        assert!(insert(5, 30, 101, "waiting", 6).is_err());
        assert!(insert(5, 30, 50, "discharged", 7).is_err());
        // arrival_sequence is unique
        assert!(insert(5, 30, 50, "waiting", 1).is_err());
    }
}
