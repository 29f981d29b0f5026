// ==========================================
// Nutri Hospital - Domain layer
// ==========================================
// Entities: Hospital, Contact, SurveyData, HospitalProduct, ImportFlag
// Rule: no data access, no import logic
// ==========================================

pub mod contact;
pub mod hospital;
pub mod import;
pub mod product;
pub mod survey;

pub use contact::{Contact, NewContact};
pub use hospital::{normalize_hospital_name, Hospital, NewHospital};
pub use import::{
    EntityCounts, ImportFlag, ImportPhase, ImportSummary, IMPORT_DONE_KEY, IMPORT_SUMMARY_KEY,
};
pub use product::{HospitalProduct, NewHospitalProduct, NutritionFacts};
pub use survey::{SurveyAnswers, SurveyData, SurveyField};
