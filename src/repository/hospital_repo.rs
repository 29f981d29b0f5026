// ==========================================
// Nutri Hospital - Hospital repository
// ==========================================
// Table: hospitais
// Deleting a hospital cascades to contatos, dados_hospitais and
// produtos_hospitais (ON DELETE CASCADE, foreign_keys = ON).
// ==========================================

use crate::domain::{Hospital, NewHospital};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str =
    "id, nome_hospital, endereco, numero, complemento, cep, cidade, estado";

fn map_hospital(row: &Row<'_>) -> rusqlite::Result<Hospital> {
    Ok(Hospital {
        id: row.get(0)?,
        nome_hospital: row.get(1)?,
        endereco: row.get(2)?,
        numero: row.get(3)?,
        complemento: row.get(4)?,
        cep: row.get(5)?,
        cidade: row.get(6)?,
        estado: row.get(7)?,
    })
}

pub struct HospitalRepository {
    conn: Arc<Mutex<Connection>>,
}

impl HospitalRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ===== Transaction-scoped helpers (used by the import phases) =====

    /// Insert a hospital and return its id.
    ///
    /// With `hospital.id = Some(id)` the row keeps that id; the caller is
    /// responsible for checking it is free.
    pub fn insert_tx(conn: &Connection, hospital: &NewHospital) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO hospitais (
                id, nome_hospital, endereco, numero, complemento, cep, cidade, estado
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                hospital.id,
                hospital.nome_hospital.trim(),
                hospital.endereco,
                hospital.numero,
                hospital.complemento,
                hospital.cep,
                hospital.cidade,
                hospital.estado,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn exists_tx(conn: &Connection, id: i64) -> RepositoryResult<bool> {
        let found = conn
            .query_row("SELECT 1 FROM hospitais WHERE id = ?1", [id], |_row| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    pub fn list_tx(conn: &Connection) -> RepositoryResult<Vec<Hospital>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM hospitais ORDER BY nome_hospital COLLATE NOCASE, id"
        ))?;
        let rows = stmt.query_map([], map_hospital)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn find_by_id_tx(conn: &Connection, id: i64) -> RepositoryResult<Option<Hospital>> {
        let hospital = conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM hospitais WHERE id = ?1"),
                [id],
                map_hospital,
            )
            .optional()?;
        Ok(hospital)
    }

    // ===== Form-level operations =====

    pub fn create(&self, hospital: &NewHospital) -> RepositoryResult<Hospital> {
        let conn = self.get_conn()?;
        let id = Self::insert_tx(&conn, hospital)?;
        Self::find_by_id_tx(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Hospital".to_string(),
            id: id.to_string(),
        })
    }

    /// Update a hospital and the names denormalized into its contacts and
    /// products, in one transaction.
    pub fn update(&self, id: i64, hospital: &NewHospital) -> RepositoryResult<Hospital> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let affected = tx.execute(
            r#"
            UPDATE hospitais SET
                nome_hospital = ?2,
                endereco = ?3,
                numero = ?4,
                complemento = ?5,
                cep = ?6,
                cidade = ?7,
                estado = ?8
            WHERE id = ?1
            "#,
            params![
                id,
                hospital.nome_hospital.trim(),
                hospital.endereco,
                hospital.numero,
                hospital.complemento,
                hospital.cep,
                hospital.cidade,
                hospital.estado,
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Hospital".to_string(),
                id: id.to_string(),
            });
        }
        tx.execute(
            "UPDATE contatos SET hospital_nome = ?2 WHERE hospital_id = ?1",
            params![id, hospital.nome_hospital.trim()],
        )?;
        tx.execute(
            "UPDATE produtos_hospitais SET nome_hospital = ?2 WHERE hospital_id = ?1",
            params![id, hospital.nome_hospital.trim()],
        )?;
        tx.commit()?;
        Self::find_by_id_tx(&conn, id)?.ok_or_else(|| RepositoryError::NotFound {
            entity: "Hospital".to_string(),
            id: id.to_string(),
        })
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Hospital>> {
        let conn = self.get_conn()?;
        Self::find_by_id_tx(&conn, id)
    }

    /// All hospitals ordered by name.
    pub fn list(&self) -> RepositoryResult<Vec<Hospital>> {
        let conn = self.get_conn()?;
        Self::list_tx(&conn)
    }

    /// Delete a hospital with its contacts, survey data and products.
    ///
    /// Returns false when no such hospital exists.
    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM hospitais WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM hospitais", [], |row| row.get(0))?;
        Ok(count)
    }
}
