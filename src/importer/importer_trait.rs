// ==========================================
// Nutri Hospital - Importer traits
// ==========================================
// Interfaces only; implementations live next to this file.
// ==========================================

use crate::domain::ImportSummary;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::{read_data_sheet, Sheet};
use crate::importer::loaders::SheetLoad;
use crate::repository::ResetCounts;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// BulkImporter - one-time import of the four sheets
// ==========================================
// Implementor: BulkImportService
#[async_trait]
pub trait BulkImporter: Send + Sync {
    /// Run the import once.
    ///
    /// # Returns
    /// - Ok(summary) with `already_imported = true` when the flag is set
    ///   (nothing is read or written)
    /// - Ok(summary) with per-entity counts after a completed run
    /// - Err(PhaseFailed) when a storage error aborts a phase; earlier
    ///   phases stay committed and the flag stays unset
    async fn run_import(&self) -> ImportResult<ImportSummary>;

    /// Whether the completion flag is set.
    async fn is_import_done(&self) -> ImportResult<bool>;

    /// Delete all imported and manually entered data and clear the flag.
    async fn reset(&self) -> ImportResult<ResetCounts>;
}

// ==========================================
// SheetParser - file -> raw sheets
// ==========================================
pub trait SheetParser: Send + Sync {
    fn parse_sheets(&self, path: &Path) -> ImportResult<Vec<Sheet>>;
}

// ==========================================
// SheetLoader - raw sheet -> normalized records
// ==========================================
pub trait SheetLoader: Send + Sync {
    type Record;

    /// File stem looked up in the data directory.
    fn file_stem(&self) -> &str;

    fn load_sheet(&self, sheet: &Sheet) -> SheetLoad<Self::Record>;

    /// Read `<dir>/<stem>.{xlsx,xls,csv}` and normalize it.
    fn load(&self, dir: &Path) -> ImportResult<SheetLoad<Self::Record>> {
        let sheet = read_data_sheet(dir, self.file_stem())?;
        Ok(self.load_sheet(&sheet))
    }
}
