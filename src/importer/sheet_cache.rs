// ==========================================
// Nutri Hospital - Parsed workbook cache
// ==========================================
// Keyed by path; an entry is reused while the file's modification time is
// unchanged and reparsed otherwise. Owned by its user, never global.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{Sheet, UniversalFileParser};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;
use tracing::debug;

struct CachedWorkbook {
    modified: SystemTime,
    sheets: Arc<Vec<Sheet>>,
}

#[derive(Default)]
pub struct SheetCache {
    entries: Mutex<HashMap<PathBuf, CachedWorkbook>>,
    loads: AtomicUsize, // number of actual parses
}

impl SheetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheets of the workbook at `path`, parsed at most once per mtime.
    pub fn get_or_load(&self, path: &Path) -> ImportResult<Arc<Vec<Sheet>>> {
        let modified = std::fs::metadata(path)?.modified()?;

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| ImportError::InternalError(format!("sheet cache lock poisoned: {e}")))?;

        if let Some(cached) = entries.get(path) {
            if cached.modified == modified {
                return Ok(Arc::clone(&cached.sheets));
            }
            debug!(file = %path.display(), "workbook changed on disk, reloading");
        }

        let sheets = Arc::new(UniversalFileParser.parse_sheets(path)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            path.to_path_buf(),
            CachedWorkbook {
                modified,
                sheets: Arc::clone(&sheets),
            },
        );
        Ok(sheets)
    }

    pub fn invalidate(&self, path: &Path) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(path);
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}
