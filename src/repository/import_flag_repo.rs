// ==========================================
// Nutri Hospital - app_meta repository
// ==========================================
// Holds the one-time import flag and the JSON summary of the run that
// set it. The flag key is the PRIMARY KEY, so a second writer hits a
// UNIQUE violation instead of silently overwriting.
// ==========================================

use crate::domain::{ImportFlag, ImportSummary, IMPORT_DONE_KEY, IMPORT_SUMMARY_KEY};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

/// Row counts removed by [`ImportFlagRepository::reset_all_tx`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResetCounts {
    pub hospitals: usize,
    pub contacts: usize,
    pub survey: usize,
    pub products: usize,
}

pub struct ImportFlagRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportFlagRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_tx(conn: &Connection, key: &str) -> RepositoryResult<Option<ImportFlag>> {
        let row: Option<(String, Option<String>, String)> = conn
            .query_row(
                "SELECT key, value, created_at FROM app_meta WHERE key = ?1",
                [key],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        row.map(|(key, value, created_at)| {
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| RepositoryError::FieldValueError {
                    field: "created_at".to_string(),
                    message: e.to_string(),
                })?;
            Ok(ImportFlag {
                key,
                value,
                created_at,
            })
        })
        .transpose()
    }

    /// Insert the completion flag.
    ///
    /// Fails with `UniqueConstraintViolation` when the flag already exists.
    pub fn insert_done_flag_tx(conn: &Connection) -> RepositoryResult<ImportFlag> {
        let flag = ImportFlag {
            key: IMPORT_DONE_KEY.to_string(),
            value: Some("done".to_string()),
            created_at: Utc::now(),
        };
        conn.execute(
            "INSERT INTO app_meta (key, value, created_at) VALUES (?1, ?2, ?3)",
            params![flag.key, flag.value, flag.created_at.to_rfc3339()],
        )?;
        Ok(flag)
    }

    pub fn upsert_summary_tx(conn: &Connection, summary: &ImportSummary) -> RepositoryResult<()> {
        let json = serde_json::to_string(summary)?;
        conn.execute(
            r#"
            INSERT INTO app_meta (key, value, created_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, created_at = excluded.created_at
            "#,
            params![IMPORT_SUMMARY_KEY, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove every hospital, contact, survey and product row together
    /// with the import flag and summary.
    pub fn reset_all_tx(conn: &Connection) -> RepositoryResult<ResetCounts> {
        let counts = ResetCounts {
            products: conn.execute("DELETE FROM produtos_hospitais", [])?,
            survey: conn.execute("DELETE FROM dados_hospitais", [])?,
            contacts: conn.execute("DELETE FROM contatos", [])?,
            hospitals: conn.execute("DELETE FROM hospitais", [])?,
        };
        conn.execute(
            "DELETE FROM app_meta WHERE key IN (?1, ?2)",
            params![IMPORT_DONE_KEY, IMPORT_SUMMARY_KEY],
        )?;
        Ok(counts)
    }

    pub fn find_done_flag(&self) -> RepositoryResult<Option<ImportFlag>> {
        let conn = self.get_conn()?;
        Self::find_tx(&conn, IMPORT_DONE_KEY)
    }

    pub fn is_import_done(&self) -> RepositoryResult<bool> {
        Ok(self
            .find_done_flag()?
            .map(|flag| flag.is_done())
            .unwrap_or(false))
    }

    /// Summary stored by the completed import, if any.
    pub fn last_summary(&self) -> RepositoryResult<Option<ImportSummary>> {
        let conn = self.get_conn()?;
        match Self::find_tx(&conn, IMPORT_SUMMARY_KEY)?.and_then(|flag| flag.value) {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use crate::domain::NewHospital;
    use crate::repository::HospitalRepository;

    fn setup() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[test]
    fn test_done_flag_is_written_once() {
        let conn = setup();
        let repo = ImportFlagRepository::new(conn.clone());
        assert!(!repo.is_import_done().unwrap());

        {
            let guard = conn.lock().unwrap();
            ImportFlagRepository::insert_done_flag_tx(&guard).unwrap();
            let second = ImportFlagRepository::insert_done_flag_tx(&guard);
            assert!(matches!(
                second,
                Err(RepositoryError::UniqueConstraintViolation(_))
            ));
        }

        assert!(repo.is_import_done().unwrap());
    }

    #[test]
    fn test_summary_roundtrip_and_reset() {
        let conn = setup();
        let repo = ImportFlagRepository::new(conn.clone());
        HospitalRepository::new(conn.clone())
            .create(&NewHospital::named("H1"))
            .unwrap();

        let mut summary = ImportSummary {
            run_id: "run-1".to_string(),
            ..Default::default()
        };
        summary.hospitals.created = 1;
        {
            let guard = conn.lock().unwrap();
            ImportFlagRepository::insert_done_flag_tx(&guard).unwrap();
            ImportFlagRepository::upsert_summary_tx(&guard, &summary).unwrap();
        }
        assert_eq!(repo.last_summary().unwrap(), Some(summary));

        let counts = {
            let guard = conn.lock().unwrap();
            ImportFlagRepository::reset_all_tx(&guard).unwrap()
        };
        assert_eq!(counts.hospitals, 1);
        assert!(!repo.is_import_done().unwrap());
        assert!(repo.last_summary().unwrap().is_none());
    }
}
