// ==========================================
// Nutri Hospital - Bulk import domain types
// ==========================================
// ImportFlag lives in app_meta; ImportSummary is returned to callers and
// stored as JSON alongside the flag.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// app_meta key marking the one-time bulk import as done.
pub const IMPORT_DONE_KEY: &str = "bulk_import_done";

/// app_meta key holding the JSON summary of the completed import.
pub const IMPORT_SUMMARY_KEY: &str = "bulk_import_summary";

// ==========================================
// ImportFlag - app_meta row
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFlag {
    pub key: String,
    pub value: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ImportFlag {
    pub fn is_done(&self) -> bool {
        self.key == IMPORT_DONE_KEY && self.value.as_deref() == Some("done")
    }
}

// ==========================================
// ImportPhase - orchestrator state machine
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportPhase {
    NotStarted,
    Hospitals,
    Contacts,
    Survey,
    Products,
    Finalizing,
    Done,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportPhase::NotStarted => write!(f, "NOT_STARTED"),
            ImportPhase::Hospitals => write!(f, "HOSPITALS"),
            ImportPhase::Contacts => write!(f, "CONTACTS"),
            ImportPhase::Survey => write!(f, "SURVEY"),
            ImportPhase::Products => write!(f, "PRODUCTS"),
            ImportPhase::Finalizing => write!(f, "FINALIZING"),
            ImportPhase::Done => write!(f, "DONE"),
        }
    }
}

// ==========================================
// EntityCounts - per-entity outcome counters
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCounts {
    pub read: usize,          // normalized records handed to the phase
    pub dropped: usize,       // source rows dropped by the normalizer
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,       // existing / unresolvable, not persisted
    pub unassociated: usize,  // persisted without a hospital reference
}

impl EntityCounts {
    pub fn persisted(&self) -> usize {
        self.created + self.updated
    }
}

impl fmt::Display for EntityCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read={} dropped={} created={} updated={} skipped={} unassociated={}",
            self.read, self.dropped, self.created, self.updated, self.skipped, self.unassociated
        )
    }
}

// ==========================================
// ImportSummary - result of one run
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub run_id: String,
    pub already_imported: bool,     // true: no-op run, counts are zero
    pub hospitals: EntityCounts,
    pub contacts: EntityCounts,
    pub survey: EntityCounts,
    pub products: EntityCounts,
    pub elapsed_ms: u64,
}

impl ImportSummary {
    pub fn already_imported(run_id: String) -> Self {
        Self {
            run_id,
            already_imported: true,
            ..Default::default()
        }
    }
}
