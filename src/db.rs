// ==========================================
// Nutri Hospital - SQLite connection + schema
// ==========================================
// Goals:
// - every Connection::open gets the same PRAGMAs (foreign keys drive the
//   hospital cascades, so they must be on for every connection)
// - one busy_timeout for all connections
// - idempotent schema creation stamped in schema_version
// ==========================================

use crate::domain::SurveyField;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default busy_timeout (ms)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// schema_version written by [`ensure_schema`]
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the shared PRAGMAs to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings.
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a connection with the shared configuration.
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Open a configured connection, create the schema, and wrap it for sharing
/// between repositories.
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<Arc<Mutex<Connection>>> {
    let conn = open_sqlite_connection(db_path)?;
    ensure_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// Read schema_version (None when the table does not exist).
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create all tables if missing. Safe to call on every start.
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS hospitais (
            id INTEGER PRIMARY KEY,
            nome_hospital TEXT NOT NULL CHECK (length(trim(nome_hospital)) > 0),
            endereco TEXT NOT NULL DEFAULT '',
            numero TEXT NOT NULL DEFAULT '',
            complemento TEXT NOT NULL DEFAULT '',
            cep TEXT NOT NULL DEFAULT '',
            cidade TEXT NOT NULL DEFAULT '',
            estado TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS contatos (
            id INTEGER PRIMARY KEY,
            hospital_id INTEGER REFERENCES hospitais(id) ON DELETE CASCADE,
            hospital_nome TEXT NOT NULL DEFAULT '',
            nome_contato TEXT NOT NULL CHECK (length(trim(nome_contato)) > 0),
            cargo TEXT NOT NULL DEFAULT '',
            telefone TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_contatos_hospital ON contatos(hospital_id);

        CREATE TABLE IF NOT EXISTS produtos_hospitais (
            id INTEGER PRIMARY KEY,
            hospital_id INTEGER NOT NULL REFERENCES hospitais(id) ON DELETE CASCADE,
            nome_hospital TEXT NOT NULL DEFAULT '',
            marca_planilha TEXT NOT NULL DEFAULT '',
            produto TEXT NOT NULL CHECK (length(trim(produto)) > 0),
            quantidade INTEGER NOT NULL DEFAULT 0 CHECK (quantidade >= 0),
            embalagem TEXT NOT NULL DEFAULT '',
            referencia TEXT NOT NULL DEFAULT '',
            kcal TEXT NOT NULL DEFAULT '',
            ptn TEXT NOT NULL DEFAULT '',
            lip TEXT NOT NULL DEFAULT '',
            fibras TEXT NOT NULL DEFAULT '',
            sodio TEXT NOT NULL DEFAULT '',
            ferro TEXT NOT NULL DEFAULT '',
            potassio TEXT NOT NULL DEFAULT '',
            vit_b12 TEXT NOT NULL DEFAULT '',
            gordura_saturada TEXT NOT NULL DEFAULT ''
        );
        CREATE INDEX IF NOT EXISTS idx_produtos_hospital ON produtos_hospitais(hospital_id);

        CREATE TABLE IF NOT EXISTS app_meta (
            key TEXT PRIMARY KEY,
            value TEXT,
            created_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(&survey_table_ddl())?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// dados_hospitais has one TEXT column per questionnaire field.
fn survey_table_ddl() -> String {
    let columns: String = SurveyField::ALL
        .iter()
        .map(|f| format!("            {} TEXT NOT NULL DEFAULT '',\n", f.key()))
        .collect();

    format!(
        r#"
        CREATE TABLE IF NOT EXISTS dados_hospitais (
            id INTEGER PRIMARY KEY,
            hospital_id INTEGER NOT NULL UNIQUE REFERENCES hospitais(id) ON DELETE CASCADE,
{columns}            extras_json TEXT NOT NULL DEFAULT '{{}}'
        );
        "#
    )
}
