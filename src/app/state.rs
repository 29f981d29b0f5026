// ==========================================
// Nutri Hospital - Application state
// ==========================================
// One shared SQLite connection and the services built on it.
// ==========================================

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ImportApi, RegistryApi};
use crate::config::{ConfigManager, ImportSettings, ImportSettingsReader};
use crate::db::open_shared_connection;
use crate::importer::{BulkImportService, ProductCatalog};
use crate::report::ReportService;
use crate::repository::{ImportFlagRepository, RepositoryResult};

/// Env var overriding the database location.
pub const DB_PATH_ENV: &str = "NUTRI_HOSPITAL_DB_PATH";

pub struct AppState {
    pub db_path: String,
    pub conn: Arc<Mutex<Connection>>,

    pub registry_api: Arc<RegistryApi>,
    pub report_service: Arc<ReportService>,
    pub config_manager: Arc<ConfigManager>,
    pub import_flag_repo: Arc<ImportFlagRepository>,
}

impl AppState {
    /// Open (and create when missing) the database at `db_path`.
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing app state");

        let conn = open_shared_connection(&db_path)
            .map_err(|e| format!("could not open database {}: {}", db_path, e))?;

        Ok(Self {
            registry_api: Arc::new(RegistryApi::from_connection(conn.clone())),
            report_service: Arc::new(ReportService::new(conn.clone())),
            config_manager: Arc::new(ConfigManager::from_connection(conn.clone())),
            import_flag_repo: Arc::new(ImportFlagRepository::new(conn.clone())),
            conn,
            db_path,
        })
    }

    /// Import settings from config_kv, with the data directory optionally
    /// replaced by `data_dir`.
    pub async fn import_settings(
        &self,
        data_dir: Option<&Path>,
    ) -> RepositoryResult<ImportSettings> {
        let mut settings = self.config_manager.import_settings().await?;
        if let Some(dir) = data_dir {
            settings.data_dir = dir.to_path_buf();
        }
        Ok(settings)
    }

    /// Import API over a fresh importer configured with `settings`.
    pub fn import_api(&self, settings: ImportSettings) -> ImportApi {
        let importer = Arc::new(BulkImportService::new(self.conn.clone(), settings));
        ImportApi::new(importer, self.import_flag_repo.clone())
    }

    pub fn product_catalog(&self, settings: &ImportSettings) -> ProductCatalog {
        ProductCatalog::discover(settings.data_dir(), &settings.catalog_file)
    }
}

/// Default database path.
///
/// `NUTRI_HOSPITAL_DB_PATH` when set, else
/// `<data_dir>/nutri-hospital/nutri_hospital.db`, else `./nutri_hospital.db`.
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./nutri_hospital.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("nutri-hospital");
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("nutri_hospital.db");
        }
    }
    path.to_string_lossy().to_string()
}
