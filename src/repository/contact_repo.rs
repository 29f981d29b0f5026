// ==========================================
// Nutri Hospital - Contact repository
// ==========================================
// Table: contatos (hospital_id nullable)
// ==========================================

use crate::domain::{Contact, NewContact};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "id, hospital_id, hospital_nome, nome_contato, cargo, telefone";

fn map_contact(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        hospital_id: row.get(1)?,
        hospital_nome: row.get(2)?,
        nome_contato: row.get(3)?,
        cargo: row.get(4)?,
        telefone: row.get(5)?,
    })
}

pub struct ContactRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContactRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert_tx(conn: &Connection, contact: &NewContact) -> RepositoryResult<i64> {
        conn.execute(
            r#"
            INSERT INTO contatos (hospital_id, hospital_nome, nome_contato, cargo, telefone)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                contact.hospital_id,
                contact.hospital_nome,
                contact.nome_contato.trim(),
                contact.cargo,
                contact.telefone,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn query(
        conn: &Connection,
        sql: &str,
        hospital_id: Option<i64>,
    ) -> RepositoryResult<Vec<Contact>> {
        let mut stmt = conn.prepare(sql)?;
        let rows = match hospital_id {
            Some(id) => stmt.query_map([id], map_contact)?,
            None => stmt.query_map([], map_contact)?,
        };
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    pub fn create(&self, contact: &NewContact) -> RepositoryResult<Contact> {
        let conn = self.get_conn()?;
        let id = Self::insert_tx(&conn, contact)?;
        Ok(Contact {
            id,
            hospital_id: contact.hospital_id,
            hospital_nome: contact.hospital_nome.clone(),
            nome_contato: contact.nome_contato.trim().to_string(),
            cargo: contact.cargo.clone(),
            telefone: contact.telefone.clone(),
        })
    }

    /// All contacts ordered by contact name.
    pub fn list(&self) -> RepositoryResult<Vec<Contact>> {
        let conn = self.get_conn()?;
        Self::query(
            &conn,
            &format!(
                "SELECT {SELECT_COLUMNS} FROM contatos ORDER BY nome_contato COLLATE NOCASE, id"
            ),
            None,
        )
    }

    pub fn list_by_hospital(&self, hospital_id: i64) -> RepositoryResult<Vec<Contact>> {
        let conn = self.get_conn()?;
        Self::query(
            &conn,
            &format!(
                "SELECT {SELECT_COLUMNS} FROM contatos WHERE hospital_id = ?1 \
                 ORDER BY nome_contato COLLATE NOCASE, id"
            ),
            Some(hospital_id),
        )
    }

    /// Contacts whose source row could not be linked to a hospital.
    pub fn list_unassociated(&self) -> RepositoryResult<Vec<Contact>> {
        let conn = self.get_conn()?;
        Self::query(
            &conn,
            &format!(
                "SELECT {SELECT_COLUMNS} FROM contatos WHERE hospital_id IS NULL \
                 ORDER BY nome_contato COLLATE NOCASE, id"
            ),
            None,
        )
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM contatos WHERE id = ?1", [id])?;
        Ok(affected > 0)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM contatos", [], |row| row.get(0))?;
        Ok(count)
    }
}
