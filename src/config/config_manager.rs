// ==========================================
// Nutri Hospital - Config manager
// ==========================================
// Storage: config_kv (key, value, updated_at)
// Missing keys fall back to the compiled-in defaults.
// ==========================================

use crate::config::import_config_trait::ImportSettingsReader;
use crate::config::import_settings::{
    ImportSettings, DEFAULT_CATALOG_FILE, DEFAULT_CONTACTS_FILE, DEFAULT_DATA_DIR,
    DEFAULT_HOSPITALS_FILE, DEFAULT_PRODUCTS_FILE, DEFAULT_SURVEY_FILE,
};
use crate::repository::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// config_kv keys
// ==========================================
pub mod config_keys {
    pub const DATA_DIR: &str = "import.data_dir";
    pub const HOSPITALS_FILE: &str = "import.hospitals_file";
    pub const CONTACTS_FILE: &str = "import.contacts_file";
    pub const SURVEY_FILE: &str = "import.survey_file";
    pub const PRODUCTS_FILE: &str = "import.products_file";
    pub const CATALOG_FILE: &str = "import.catalog_file";
}

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Build from the shared connection.
    ///
    /// The schema (config_kv included) must already exist.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Stored value, or `default` when the key is absent or blank.
    fn get_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// All stored keys and values.
    pub fn snapshot(&self) -> RepositoryResult<BTreeMap<String, String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut out = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            out.insert(key, value);
        }
        Ok(out)
    }
}

#[async_trait]
impl ImportSettingsReader for ConfigManager {
    async fn get_data_dir(&self) -> RepositoryResult<String> {
        self.get_or_default(config_keys::DATA_DIR, DEFAULT_DATA_DIR)
    }

    async fn get_file_stem(&self, input: &str) -> RepositoryResult<String> {
        let (key, default) = match input {
            "hospitals" => (config_keys::HOSPITALS_FILE, DEFAULT_HOSPITALS_FILE),
            "contacts" => (config_keys::CONTACTS_FILE, DEFAULT_CONTACTS_FILE),
            "survey" => (config_keys::SURVEY_FILE, DEFAULT_SURVEY_FILE),
            "products" => (config_keys::PRODUCTS_FILE, DEFAULT_PRODUCTS_FILE),
            "catalog" => (config_keys::CATALOG_FILE, DEFAULT_CATALOG_FILE),
            other => {
                return Err(RepositoryError::FieldValueError {
                    field: "input".to_string(),
                    message: format!("unknown import input: {other}"),
                })
            }
        };
        self.get_or_default(key, default)
    }

    async fn import_settings(&self) -> RepositoryResult<ImportSettings> {
        Ok(ImportSettings {
            data_dir: PathBuf::from(self.get_data_dir().await?),
            hospitals_file: self.get_file_stem("hospitals").await?,
            contacts_file: self.get_file_stem("contacts").await?,
            survey_file: self.get_file_stem("survey").await?,
            products_file: self.get_file_stem("products").await?,
            catalog_file: self.get_file_stem("catalog").await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[tokio::test]
    async fn test_defaults_without_overrides() {
        let config = setup();
        assert_eq!(config.import_settings().await.unwrap(), ImportSettings::default());
    }

    #[tokio::test]
    async fn test_stored_values_override_defaults() {
        let config = setup();
        config.set_value(config_keys::DATA_DIR, "/srv/planilhas").unwrap();
        config.set_value(config_keys::CONTACTS_FILE, "contatos_2024").unwrap();
        config.set_value(config_keys::SURVEY_FILE, "   ").unwrap();

        let settings = config.import_settings().await.unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/srv/planilhas"));
        assert_eq!(settings.contacts_file, "contatos_2024");
        assert_eq!(settings.survey_file, DEFAULT_SURVEY_FILE);
        assert_eq!(config.snapshot().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_input_is_rejected() {
        let config = setup();
        assert!(config.get_file_stem("invoices").await.is_err());
    }
}
