// ==========================================
// Nutri Hospital - Report errors
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("hospital not found: id={0}")]
    HospitalNotFound(i64),

    #[error("export failed ({path}): {message}")]
    ExportError { path: String, message: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ReportError {
    /// Attach the file being written to an I/O, CSV or JSON error.
    pub fn export<E: std::fmt::Display>(
        path: &std::path::Path,
    ) -> impl FnOnce(E) -> ReportError + '_ {
        move |err| ReportError::ExportError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
