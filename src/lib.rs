// ==========================================
// Nutri Hospital - Core library
// ==========================================
// Hospital registry, nutrition questionnaire and product records, with a
// tolerant one-time spreadsheet import.
// Stack: Rust + SQLite
// ==========================================

// Domain layer - entities
pub mod domain;

// Repository layer - data access
pub mod repository;

// Import layer - spreadsheets
pub mod importer;

// Configuration layer
pub mod config;

// Database setup (connection PRAGMAs, schema)
pub mod db;

// Logging
pub mod logging;

// API layer - form operations
pub mod api;

// Reports and CSV export
pub mod report;

// Application layer - shared state
pub mod app;

// ==========================================
// Re-exports
// ==========================================

pub use domain::{
    Contact, EntityCounts, Hospital, HospitalProduct, ImportPhase, ImportSummary, NewContact,
    NewHospital, NewHospitalProduct, NutritionFacts, SurveyAnswers, SurveyData, SurveyField,
};

pub use api::{ApiError, ApiResult, ImportApi, RegistryApi};

pub use importer::{BulkImportService, BulkImporter, ImportError, ProductCatalog};

pub use report::{HospitalReport, OverviewReport, ReportService};

// ==========================================
// Constants
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Nutri Hospital";
