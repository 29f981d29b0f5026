// ==========================================
// Nutri Hospital - Import API
// ==========================================
// Wraps the bulk importer for callers: run, status, reset.
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::ImportSummary;
use crate::importer::BulkImporter;
use crate::repository::{ImportFlagRepository, ResetCounts};

/// Current state of the one-time import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportStatus {
    pub done: bool,
    /// When the completion flag was written
    pub completed_at: Option<DateTime<Utc>>,
    /// Summary stored by the completed run
    pub last_summary: Option<ImportSummary>,
}

pub struct ImportApi {
    importer: Arc<dyn BulkImporter>,
    flag_repo: Arc<ImportFlagRepository>,
}

impl ImportApi {
    pub fn new(importer: Arc<dyn BulkImporter>, flag_repo: Arc<ImportFlagRepository>) -> Self {
        Self {
            importer,
            flag_repo,
        }
    }

    /// Run the import. A second call after completion returns a summary
    /// with `already_imported = true`.
    pub async fn run_import(&self) -> ApiResult<ImportSummary> {
        Ok(self.importer.run_import().await?)
    }

    pub async fn status(&self) -> ApiResult<ImportStatus> {
        let done = self.importer.is_import_done().await?;
        let completed_at = self
            .flag_repo
            .find_done_flag()?
            .filter(|flag| flag.is_done())
            .map(|flag| flag.created_at);
        Ok(ImportStatus {
            done,
            completed_at,
            last_summary: self.flag_repo.last_summary()?,
        })
    }

    /// Delete all data and clear the import flag. Requires `confirmed`.
    pub async fn reset(&self, confirmed: bool) -> ApiResult<ResetCounts> {
        if !confirmed {
            return Err(ApiError::InvalidInput(
                "reset deletes every hospital, contact, questionnaire and product; \
                 confirmation required"
                    .to_string(),
            ));
        }
        let counts = self.importer.reset().await?;
        info!(hospitals = counts.hospitals, "reset confirmed and applied");
        Ok(counts)
    }
}
