// ==========================================
// Nutri Hospital - Import layer
// ==========================================
// Spreadsheet files -> sheet loaders (column resolver + row normalizer)
// -> normalized records -> bulk import orchestrator -> identity
// reconciler -> repositories.
// Supports: Excel (.xlsx/.xls), CSV
// ==========================================

pub mod bulk_importer;
pub mod catalog;
pub mod column_resolver;
pub mod error;
pub mod file_parser;
pub mod identity_reconciler;
pub mod importer_trait;
pub mod loaders;
pub mod row_normalizer;
pub mod sheet_cache;

pub use bulk_importer::{BulkImportService, SourceSheets};
pub use catalog::{CatalogEntry, ProductCatalog};
pub use column_resolver::{resolve_column, ColumnSpec, ResolvedColumns};
pub use error::{ImportError, ImportResult};
pub use file_parser::{
    find_sheet_file, read_data_sheet, Cell, CsvParser, ExcelParser, Sheet, UniversalFileParser,
};
pub use identity_reconciler::{IdentityReconciler, Resolution};
pub use importer_trait::{BulkImporter, SheetLoader, SheetParser};
pub use loaders::{
    ContactRecord, ContactSheetLoader, HospitalSheetLoader, ProductRecord, ProductSheetLoader,
    SheetLoad, SurveyRecord, SurveySheetLoader,
};
pub use sheet_cache::SheetCache;
