// ==========================================
// Nutri Hospital - API layer
// ==========================================
// Form-level operations and the import entry points used by the CLI
// ==========================================

pub mod error;
pub mod import_api;
pub mod registry_api;
pub mod validator;

pub use error::{ApiError, ApiResult, ValidationViolation};
pub use import_api::{ImportApi, ImportStatus};
pub use registry_api::RegistryApi;
pub use validator::FormValidator;
