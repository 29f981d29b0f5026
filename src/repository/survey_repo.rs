// ==========================================
// Nutri Hospital - Survey repository
// ==========================================
// Table: dados_hospitais (hospital_id UNIQUE)
// Columns for the questionnaire are generated from SurveyField::ALL;
// unrecognized headers live in extras_json.
// ==========================================

use crate::domain::{SurveyAnswers, SurveyData, SurveyField};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurveyWrite {
    Created(i64),
    Updated(i64),
}

fn field_columns() -> String {
    SurveyField::ALL
        .iter()
        .map(|f| f.key())
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_sql(filter: &str) -> String {
    format!(
        "SELECT id, hospital_id, {}, extras_json FROM dados_hospitais {filter}",
        field_columns()
    )
}

fn map_survey(row: &Row<'_>) -> rusqlite::Result<(SurveyData, String)> {
    let mut data = SurveyAnswers::default();
    for (idx, field) in SurveyField::ALL.iter().enumerate() {
        let value: String = row.get(idx + 2)?;
        data.set(*field, value);
    }
    let extras_json: String = row.get(SurveyField::ALL.len() + 2)?;
    Ok((
        SurveyData {
            id: row.get(0)?,
            hospital_id: row.get(1)?,
            data,
        },
        extras_json,
    ))
}

fn attach_extras((mut survey, extras_json): (SurveyData, String)) -> RepositoryResult<SurveyData> {
    survey.data.extras = if extras_json.trim().is_empty() {
        BTreeMap::new()
    } else {
        serde_json::from_str(&extras_json)?
    };
    Ok(survey)
}

pub struct SurveyRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SurveyRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn find_by_hospital_tx(
        conn: &Connection,
        hospital_id: i64,
    ) -> RepositoryResult<Option<SurveyData>> {
        let raw = conn
            .query_row(&select_sql("WHERE hospital_id = ?1"), [hospital_id], map_survey)
            .optional()?;
        raw.map(attach_extras).transpose()
    }

    /// Insert or overwrite the questionnaire of a hospital.
    ///
    /// Every field is written; unanswered fields become ''.
    pub fn upsert_tx(
        conn: &Connection,
        hospital_id: i64,
        data: &SurveyAnswers,
    ) -> RepositoryResult<SurveyWrite> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM dados_hospitais WHERE hospital_id = ?1",
                [hospital_id],
                |row| row.get(0),
            )
            .optional()?;

        let mut values: Vec<Value> = Vec::with_capacity(SurveyField::ALL.len() + 2);
        values.push(Value::Integer(hospital_id));
        for field in SurveyField::ALL {
            values.push(Value::Text(data.get(field).to_string()));
        }
        values.push(Value::Text(serde_json::to_string(&data.extras)?));

        match existing {
            Some(id) => {
                let assignments = SurveyField::ALL
                    .iter()
                    .enumerate()
                    .map(|(idx, f)| format!("{} = ?{}", f.key(), idx + 2))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "UPDATE dados_hospitais SET {assignments}, extras_json = ?{} \
                     WHERE hospital_id = ?1",
                    SurveyField::ALL.len() + 2
                );
                conn.execute(&sql, params_from_iter(values))?;
                Ok(SurveyWrite::Updated(id))
            }
            None => {
                let placeholders = (1..=values.len())
                    .map(|i| format!("?{i}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "INSERT INTO dados_hospitais (hospital_id, {}, extras_json) \
                     VALUES ({placeholders})",
                    field_columns()
                );
                conn.execute(&sql, params_from_iter(values))?;
                Ok(SurveyWrite::Created(conn.last_insert_rowid()))
            }
        }
    }

    pub fn find_by_hospital(&self, hospital_id: i64) -> RepositoryResult<Option<SurveyData>> {
        let conn = self.get_conn()?;
        Self::find_by_hospital_tx(&conn, hospital_id)
    }

    /// Questionnaire of a hospital, created empty on first access.
    pub fn get_or_create(&self, hospital_id: i64) -> RepositoryResult<SurveyData> {
        let conn = self.get_conn()?;
        if let Some(found) = Self::find_by_hospital_tx(&conn, hospital_id)? {
            return Ok(found);
        }
        let id = match Self::upsert_tx(&conn, hospital_id, &SurveyAnswers::default())? {
            SurveyWrite::Created(id) | SurveyWrite::Updated(id) => id,
        };
        Ok(SurveyData {
            id,
            hospital_id,
            data: SurveyAnswers::default(),
        })
    }

    /// Overwrite every field of the questionnaire.
    pub fn save(&self, hospital_id: i64, data: &SurveyAnswers) -> RepositoryResult<SurveyData> {
        let conn = self.get_conn()?;
        Self::upsert_tx(&conn, hospital_id, data)?;
        Self::find_by_hospital_tx(&conn, hospital_id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "SurveyData".to_string(),
            id: hospital_id.to_string(),
        })
    }

    pub fn list(&self) -> RepositoryResult<Vec<SurveyData>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&select_sql("ORDER BY hospital_id"))?;
        let rows = stmt.query_map([], map_survey)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(attach_extras(row?)?);
        }
        Ok(out)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM dados_hospitais", [], |row| row.get(0))?;
        Ok(count)
    }
}
