// ==========================================
// Nutri Hospital - Repository layer
// ==========================================
// Rule: no import or validation logic in repositories
// All queries are parameterized; the only dynamic SQL is built from
// compile-time column lists (SurveyField, NutritionFacts).
// ==========================================
// `*_tx(conn, ..)` helpers take a borrowed Connection so the import
// phases can run them inside one transaction.
// ==========================================

pub mod contact_repo;
pub mod error;
pub mod hospital_repo;
pub mod import_flag_repo;
pub mod product_repo;
pub mod survey_repo;

pub use contact_repo::ContactRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use hospital_repo::HospitalRepository;
pub use import_flag_repo::{ImportFlagRepository, ResetCounts};
pub use product_repo::{ProductRepository, ProductWrite};
pub use survey_repo::{SurveyRepository, SurveyWrite};
