// ==========================================
// Nutri Hospital - API error type
// ==========================================
// Turns repository and import errors into messages a form or the CLI can
// show as-is.
// ==========================================

use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API layer error
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== Business rule errors =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("business rule violated: {0}")]
    BusinessRuleViolation(String),

    // ===== Data access errors =====
    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    // ===== Import errors =====
    #[error("import failed: {0}")]
    ImportError(String),

    /// Form validation failed on one or more fields.
    #[error("validation failed: {reason}")]
    ValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("could not lock database: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("duplicate record: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("unknown reference: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("value out of range: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("field {}: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(repo) => repo.into(),
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// One failed field of a form submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub field: String,
    pub reason: String,
}

impl ValidationViolation {
    pub fn new(field: &str, reason: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_conversion() {
        let repo_err = RepositoryError::NotFound {
            entity: "Hospital".to_string(),
            id: "5".to_string(),
        };
        let api_err: ApiError = repo_err.into();
        match api_err {
            ApiError::NotFound(msg) => {
                assert!(msg.contains("Hospital"));
                assert!(msg.contains("5"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }

        let api_err: ApiError =
            RepositoryError::CheckConstraintViolation("quantidade >= 0".to_string()).into();
        assert!(matches!(api_err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn test_import_error_conversion_unwraps_repository_errors() {
        let err = ImportError::Repository(RepositoryError::LockError("poisoned".to_string()));
        assert!(matches!(ApiError::from(err), ApiError::DatabaseConnectionError(_)));

        let err = ImportError::UnsupportedFormat("dados.ods".to_string());
        match ApiError::from(err) {
            ApiError::ImportError(msg) => assert!(msg.contains("dados.ods")),
            other => panic!("expected ImportError, got {other:?}"),
        }
    }
}
