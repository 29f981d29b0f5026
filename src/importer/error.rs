// ==========================================
// Nutri Hospital - Import error type
// ==========================================
// Bad rows never surface here: they are dropped and counted by the
// loaders. Only file-level and storage-level failures are errors.
// ==========================================

use crate::domain::ImportPhase;
use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== File errors =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported file format: {0} (expected .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileReadError(String),

    #[error("workbook parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== Storage errors =====
    #[error("import phase {phase} failed: {source}")]
    PhaseFailed {
        phase: ImportPhase,
        #[source]
        source: RepositoryError,
    },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl ImportError {
    /// Attach the failing phase to a storage error.
    pub fn in_phase(phase: ImportPhase) -> impl FnOnce(RepositoryError) -> ImportError {
        move |source| ImportError::PhaseFailed { phase, source }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

pub type ImportResult<T> = Result<T, ImportError>;
