// ==========================================
// Nutri Hospital - Import settings
// ==========================================
// Where the import reads its spreadsheets from.
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_HOSPITALS_FILE: &str = "hospitais";
pub const DEFAULT_CONTACTS_FILE: &str = "contatos";
pub const DEFAULT_SURVEY_FILE: &str = "dadoshospitais";
pub const DEFAULT_PRODUCTS_FILE: &str = "produtoshospitais";
pub const DEFAULT_CATALOG_FILE: &str = "produtos";

/// Data directory plus one file stem per input.
///
/// Stems are looked up as `<stem>.xlsx`, `<stem>.xls`, `<stem>.csv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSettings {
    pub data_dir: PathBuf,
    pub hospitals_file: String,
    pub contacts_file: String,
    pub survey_file: String,
    pub products_file: String,
    pub catalog_file: String,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            hospitals_file: DEFAULT_HOSPITALS_FILE.to_string(),
            contacts_file: DEFAULT_CONTACTS_FILE.to_string(),
            survey_file: DEFAULT_SURVEY_FILE.to_string(),
            products_file: DEFAULT_PRODUCTS_FILE.to_string(),
            catalog_file: DEFAULT_CATALOG_FILE.to_string(),
        }
    }
}

impl ImportSettings {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
