// ==========================================
// Nutri Hospital - Sheet loaders
// ==========================================
// One loader per input sheet. Each declares its column candidates and
// mandatory field; the shared driver below resolves the columns once per
// sheet, drops blank rows and rows missing the mandatory field, and maps
// the rest to records.
// ==========================================

pub mod contact_loader;
pub mod hospital_loader;
pub mod product_loader;
pub mod survey_loader;

pub use contact_loader::{ContactRecord, ContactSheetLoader};
pub use hospital_loader::HospitalSheetLoader;
pub use product_loader::{ProductRecord, ProductSheetLoader};
pub use survey_loader::{SurveyRecord, SurveySheetLoader};

use crate::importer::column_resolver::{ColumnSpec, ResolvedColumns};
use crate::importer::file_parser::Sheet;
use crate::importer::row_normalizer::{is_blank_row, RowView};
use tracing::debug;

/// Normalized content of one sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLoad<T> {
    pub records: Vec<T>,
    pub total_rows: usize,   // data rows in the sheet, blank rows included
    pub dropped_rows: usize, // blank rows + rows missing the mandatory field
}

impl<T> Default for SheetLoad<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            total_rows: 0,
            dropped_rows: 0,
        }
    }
}

/// Resolve `specs` against the sheet and map every kept row.
///
/// `mandatory` names the field whose blank value drops the row.
pub(crate) fn normalize_rows<T>(
    sheet: &Sheet,
    specs: &[ColumnSpec],
    mandatory: &str,
    mut map: impl FnMut(&RowView<'_>) -> T,
) -> SheetLoad<T> {
    let columns = ResolvedColumns::resolve(&sheet.headers, specs);
    normalize_with_columns(sheet, &columns, mandatory, &mut map)
}

pub(crate) fn normalize_with_columns<T>(
    sheet: &Sheet,
    columns: &ResolvedColumns,
    mandatory: &str,
    map: &mut impl FnMut(&RowView<'_>) -> T,
) -> SheetLoad<T> {
    let mut load = SheetLoad {
        total_rows: sheet.rows.len(),
        ..Default::default()
    };

    for cells in &sheet.rows {
        let row = RowView::new(cells, columns);
        if is_blank_row(cells) || row.text(mandatory).is_empty() {
            load.dropped_rows += 1;
            continue;
        }
        load.records.push(map(&row));
    }

    debug!(
        sheet = %sheet.name,
        total = load.total_rows,
        kept = load.records.len(),
        dropped = load.dropped_rows,
        "sheet normalized"
    );
    load
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::file_parser::Cell;

    #[test]
    fn test_rows_without_mandatory_field_are_dropped() {
        let sheet = Sheet {
            name: "t".to_string(),
            headers: vec!["NOME".to_string(), "CIDADE".to_string()],
            rows: vec![
                vec![Cell::Text("A".into()), Cell::Text("Recife".into())],
                vec![Cell::Empty, Cell::Text("Natal".into())],
                vec![Cell::Text(" ".into()), Cell::Empty],
                vec![Cell::Text("B".into())],
            ],
        };
        let specs = [
            ColumnSpec::new("nome", &["NOME"]),
            ColumnSpec::new("cidade", &["CIDADE"]),
        ];
        let load = normalize_rows(&sheet, &specs, "nome", |row| {
            (row.text("nome"), row.text("cidade"))
        });

        assert_eq!(load.total_rows, 4);
        assert_eq!(load.dropped_rows, 2);
        assert_eq!(load.records.len(), load.total_rows - load.dropped_rows);
        assert_eq!(load.records[1], ("B".to_string(), String::new()));
    }
}
