// ==========================================
// Nutri Hospital - Column resolver
// ==========================================
// Maps logical fields to physical header positions of one sheet.
// Rules, in order:
//   1. exact match (case-insensitive, trimmed) against any candidate
//   2. candidate token contained in a header not claimed by another field
//   3. critical fields only: first column of the sheet
// Earlier candidates win ties; within a candidate the leftmost column wins.
// ==========================================

use std::collections::{BTreeSet, HashMap};

// ==========================================
// ColumnSpec - candidates for one logical field
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub field: String,
    pub exact: Vec<String>,
    pub contains: Vec<String>,
    pub critical: bool,
}

impl ColumnSpec {
    pub fn new(field: impl Into<String>, exact: &[&str]) -> Self {
        Self {
            field: field.into(),
            exact: exact.iter().map(|c| c.to_string()).collect(),
            contains: Vec::new(),
            critical: false,
        }
    }

    pub fn contains(mut self, tokens: &[&str]) -> Self {
        self.contains = tokens.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

fn norm(text: &str) -> String {
    text.trim().to_uppercase()
}

fn exact_match(
    headers: &[String],
    spec: &ColumnSpec,
    claimed: &BTreeSet<usize>,
) -> Option<usize> {
    spec.exact.iter().find_map(|candidate| {
        let candidate = norm(candidate);
        headers
            .iter()
            .enumerate()
            .find(|(idx, h)| !claimed.contains(idx) && norm(h) == candidate)
            .map(|(idx, _)| idx)
    })
}

fn substring_match(
    headers: &[String],
    spec: &ColumnSpec,
    claimed: &BTreeSet<usize>,
) -> Option<usize> {
    spec.contains.iter().find_map(|token| {
        let token = norm(token);
        if token.is_empty() {
            return None;
        }
        headers
            .iter()
            .enumerate()
            .find(|(idx, h)| !claimed.contains(idx) && norm(h).contains(&token))
            .map(|(idx, _)| idx)
    })
}

/// Resolve a single field against `headers`, ignoring other fields.
pub fn resolve_column(headers: &[String], spec: &ColumnSpec) -> Option<usize> {
    let none = BTreeSet::new();
    exact_match(headers, spec, &none)
        .or_else(|| substring_match(headers, spec, &none))
        .or_else(|| (spec.critical && !headers.is_empty()).then_some(0))
}

// ==========================================
// ResolvedColumns - field -> column index for one sheet
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedColumns {
    positions: HashMap<String, usize>,
    headers: Vec<String>,
}

impl ResolvedColumns {
    /// Resolve every spec against the sheet's header row.
    ///
    /// The exact rule runs for all fields before any substring match, so an
    /// exact header is never taken by another field's fuzzy token.
    pub fn resolve(headers: &[String], specs: &[ColumnSpec]) -> Self {
        let mut positions = HashMap::new();
        let mut claimed = BTreeSet::new();

        for spec in specs {
            if let Some(idx) = exact_match(headers, spec, &claimed) {
                positions.insert(spec.field.clone(), idx);
                claimed.insert(idx);
            }
        }

        for spec in specs {
            if positions.contains_key(&spec.field) {
                continue;
            }
            if let Some(idx) = substring_match(headers, spec, &claimed) {
                positions.insert(spec.field.clone(), idx);
                claimed.insert(idx);
            }
        }

        for spec in specs {
            if spec.critical && !positions.contains_key(&spec.field) && !headers.is_empty() {
                tracing::debug!(field = %spec.field, header = %headers[0], "positional fallback");
                positions.insert(spec.field.clone(), 0);
            }
        }

        Self {
            positions,
            headers: headers.to_vec(),
        }
    }

    pub fn index(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    /// Physical header chosen for `field`.
    pub fn header(&self, field: &str) -> Option<&str> {
        self.index(field)
            .and_then(|idx| self.headers.get(idx))
            .map(String::as_str)
    }

    pub fn is_resolved(&self, field: &str) -> bool {
        self.positions.contains_key(field)
    }

    /// Non-blank headers no field resolved to, with their positions.
    pub fn unclaimed(&self) -> Vec<(usize, &str)> {
        let claimed: BTreeSet<usize> = self.positions.values().copied().collect();
        self.headers
            .iter()
            .enumerate()
            .filter(|(idx, h)| !claimed.contains(idx) && !h.trim().is_empty())
            .map(|(idx, h)| (idx, h.as_str()))
            .collect()
    }
}
