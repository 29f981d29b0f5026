// ==========================================
// Nutri Hospital - Row normalizer
// ==========================================
// Cell -> typed value rules:
// - text: trimmed; absent / blank / "nan" / "#N/A" -> ""
// - integer: "12", "12.0", "12,0" -> 12; blank or garbage -> absent
// - quantity: like integer, but absent or negative -> 0
// ==========================================

use crate::importer::column_resolver::ResolvedColumns;
use crate::importer::file_parser::Cell;

/// Textual placeholders for a missing value (compared case-insensitively).
pub const MISSING_PLACEHOLDERS: [&str; 2] = ["nan", "#n/a"];

fn is_placeholder(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    MISSING_PLACEHOLDERS.iter().any(|p| *p == lower)
}

/// Normalize a cell to trimmed text; missing values become "".
pub fn normalize_text(cell: Option<&Cell>) -> String {
    let text = match cell {
        None => return String::new(),
        Some(cell) => cell.as_text(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() || is_placeholder(trimmed) {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Lenient integer parse.
///
/// Accepts spreadsheet float noise ("12.0") and comma decimals ("12,0").
/// A fractional value is truncated toward zero.
pub fn parse_lenient_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || is_placeholder(trimmed) {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = trimmed.replace(',', ".").parse::<f64>().ok()?;
    if !value.is_finite() || value.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i64)
}

/// Quantity parse: absent, unparseable or negative values become 0.
pub fn parse_quantity(text: &str) -> i64 {
    parse_lenient_int(text).filter(|q| *q >= 0).unwrap_or(0)
}

/// True when every cell is blank or a missing-value placeholder.
pub fn is_blank_row(cells: &[Cell]) -> bool {
    cells
        .iter()
        .all(|cell| normalize_text(Some(cell)).is_empty())
}

// ==========================================
// RowView - typed access to one row through the resolved columns
// ==========================================
pub struct RowView<'a> {
    cells: &'a [Cell],
    columns: &'a ResolvedColumns,
}

impl<'a> RowView<'a> {
    pub fn new(cells: &'a [Cell], columns: &'a ResolvedColumns) -> Self {
        Self { cells, columns }
    }

    pub fn cell(&self, field: &str) -> Option<&'a Cell> {
        self.columns.index(field).and_then(|idx| self.cells.get(idx))
    }

    pub fn cell_at(&self, idx: usize) -> Option<&'a Cell> {
        self.cells.get(idx)
    }

    /// Trimmed text; "" when the column is missing or the value is blank.
    pub fn text(&self, field: &str) -> String {
        normalize_text(self.cell(field))
    }

    pub fn int(&self, field: &str) -> Option<i64> {
        parse_lenient_int(&self.text(field))
    }

    /// Identifier; values <= 0 count as absent.
    pub fn id(&self, field: &str) -> Option<i64> {
        self.int(field).filter(|id| *id > 0)
    }

    pub fn quantity(&self, field: &str) -> i64 {
        parse_quantity(&self.text(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::column_resolver::ColumnSpec;

    #[test]
    fn test_text_normalization() {
        assert_eq!(normalize_text(None), "");
        assert_eq!(normalize_text(Some(&Cell::Empty)), "");
        assert_eq!(normalize_text(Some(&Cell::Text("  Ana ".into()))), "Ana");
        assert_eq!(normalize_text(Some(&Cell::Text("NaN".into()))), "");
        assert_eq!(normalize_text(Some(&Cell::Text("#N/A".into()))), "");
        assert_eq!(normalize_text(Some(&Cell::Number(5.0))), "5");
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(parse_lenient_int("12"), Some(12));
        assert_eq!(parse_lenient_int("12.0"), Some(12));
        assert_eq!(parse_lenient_int(" 12,0 "), Some(12));
        assert_eq!(parse_lenient_int("12.7"), Some(12));
        assert_eq!(parse_lenient_int(""), None);
        assert_eq!(parse_lenient_int("abc"), None);
        assert_eq!(parse_lenient_int("nan"), None);
    }

    #[test]
    fn test_quantity_defaults_to_zero() {
        assert_eq!(parse_quantity("12.0"), 12);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("muitos"), 0);
        assert_eq!(parse_quantity("-3"), 0);
    }

    #[test]
    fn test_blank_row_detection() {
        assert!(is_blank_row(&[Cell::Empty, Cell::Text("  ".into()), Cell::Text("nan".into())]));
        assert!(!is_blank_row(&[Cell::Empty, Cell::Number(0.0)]));
        assert!(is_blank_row(&[]));
    }

    #[test]
    fn test_row_view_ids_and_missing_columns() {
        let headers = vec!["ID_HOSPITAL".to_string(), "QTD".to_string()];
        let columns = ResolvedColumns::resolve(
            &headers,
            &[
                ColumnSpec::new("id", &["ID_HOSPITAL"]),
                ColumnSpec::new("qtd", &["QTD"]),
                ColumnSpec::new("marca", &["MARCA"]),
            ],
        );
        let cells = vec![Cell::Number(0.0), Cell::Text("3,0".into())];
        let row = RowView::new(&cells, &columns);

        assert_eq!(row.int("id"), Some(0));
        assert_eq!(row.id("id"), None);
        assert_eq!(row.quantity("qtd"), 3);
        assert_eq!(row.text("marca"), "");
    }
}
