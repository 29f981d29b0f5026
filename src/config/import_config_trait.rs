// ==========================================
// Nutri Hospital - Import settings reader trait
// ==========================================
// Read-only view of the import configuration (no writes, no import logic)
// ==========================================

use crate::config::import_settings::ImportSettings;
use crate::repository::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ImportSettingsReader
// ==========================================
// Implementor: ConfigManager (config_kv table)
#[async_trait]
pub trait ImportSettingsReader: Send + Sync {
    /// Data directory holding the input spreadsheets.
    ///
    /// # Default
    /// - `data`
    async fn get_data_dir(&self) -> RepositoryResult<String>;

    /// File stem of one input (`hospitals`, `contacts`, `survey`,
    /// `products` or `catalog`).
    ///
    /// # Default
    /// - hospitais / contatos / dadoshospitais / produtoshospitais / produtos
    async fn get_file_stem(&self, input: &str) -> RepositoryResult<String>;

    /// All import settings, stored overrides applied over the defaults.
    async fn import_settings(&self) -> RepositoryResult<ImportSettings>;
}
