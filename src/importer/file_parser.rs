// ==========================================
// Nutri Hospital - Sheet file parsers
// ==========================================
// Supports: Excel (.xlsx/.xls) via calamine, CSV via csv
// Output: Sheet (header row + raw cells), no interpretation of values.
// A workbook yields one Sheet per worksheet; a CSV file yields one Sheet
// named after the file stem.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::SheetParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions tried for a file stem, in order.
pub const SHEET_EXTENSIONS: [&str; 3] = ["xlsx", "xls", "csv"];

// ==========================================
// Cell - raw spreadsheet value
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Textual form of the cell; whole numbers render without decimals.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(_) => false,
            Cell::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

// ==========================================
// Sheet - header row + data rows
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>, // trimmed header texts, in column order
    pub rows: Vec<Vec<Cell>>, // data rows, blank rows included
}

impl Sheet {
    /// Sheet without headers or rows; used for missing input files.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn from_rows(name: String, mut rows: impl Iterator<Item = Vec<Cell>>) -> Self {
        let headers = rows
            .next()
            .map(|header| header.iter().map(|c| c.as_text().trim().to_string()).collect())
            .unwrap_or_default();
        Self {
            name,
            headers,
            rows: rows.collect(),
        }
    }
}

// ==========================================
// CSV parser
// ==========================================
pub struct CsvParser;

impl SheetParser for CsvParser {
    fn parse_sheets(&self, path: &Path) -> ImportResult<Vec<Sheet>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // rows may be shorter than the header
            .from_reader(file);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|value| {
                        if value.is_empty() {
                            Cell::Empty
                        } else {
                            Cell::Text(value.to_string())
                        }
                    })
                    .collect::<Vec<_>>(),
            );
        }

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut sheet = Sheet::from_rows(name, rows.into_iter());
        if let Some(first) = sheet.headers.first_mut() {
            // Excel-exported CSVs start with a UTF-8 BOM
            *first = first.trim_start_matches('\u{feff}').trim().to_string();
        }
        Ok(vec![sheet])
    }
}

// ==========================================
// Excel parser
// ==========================================
pub struct ExcelParser;

impl SheetParser for ExcelParser {
    fn parse_sheets(&self, path: &Path) -> ImportResult<Vec<Sheet>> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let mut workbook = open_workbook_auto(path)?;
        let mut sheets = Vec::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            let rows = range
                .rows()
                .map(|row| row.iter().map(Cell::from).collect::<Vec<_>>());
            sheets.push(Sheet::from_rows(sheet_name, rows));
        }
        Ok(sheets)
    }
}

// ==========================================
// Universal parser (dispatch by extension)
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse_sheets<P: AsRef<Path>>(&self, path: P) -> ImportResult<Vec<Sheet>> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_sheets(path),
            "xlsx" | "xls" => ExcelParser.parse_sheets(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }

    /// First worksheet of the file.
    pub fn parse_first_sheet<P: AsRef<Path>>(&self, path: P) -> ImportResult<Sheet> {
        let path = path.as_ref();
        self.parse_sheets(path)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ImportError::ExcelParseError(format!("{}: no worksheet", path.display()))
            })
    }
}

/// First existing `<stem>.xlsx`, `<stem>.xls`, `<stem>.csv` in `dir`.
pub fn find_sheet_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    SHEET_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Read the data sheet for `stem`; a missing file gives an empty sheet.
pub fn read_data_sheet(dir: &Path, stem: &str) -> ImportResult<Sheet> {
    match find_sheet_file(dir, stem) {
        Some(path) => {
            let sheet = UniversalFileParser.parse_first_sheet(&path)?;
            debug!(file = %path.display(), rows = sheet.rows.len(), "sheet read");
            Ok(sheet)
        }
        None => {
            warn!(dir = %dir.display(), stem, "input file not found, treating sheet as empty");
            Ok(Sheet::empty(stem))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_csv_parser_reads_headers_and_rows() {
        let mut temp_file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(temp_file, "\u{feff}ID_HOSPITAL, NOME_HOSPITAL ").unwrap();
        writeln!(temp_file, "5,Hospital Sao Lucas").unwrap();
        writeln!(temp_file, ",").unwrap();

        let sheets = CsvParser.parse_sheets(temp_file.path()).unwrap();
        assert_eq!(sheets.len(), 1);
        let sheet = &sheets[0];
        assert_eq!(sheet.headers, vec!["ID_HOSPITAL", "NOME_HOSPITAL"]);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][1], Cell::Text("Hospital Sao Lucas".to_string()));
        assert!(sheet.rows[1].iter().all(Cell::is_blank));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_sheets(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = UniversalFileParser.parse_sheets("hospitais.txt");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_whole_numbers_render_without_decimals() {
        assert_eq!(Cell::Number(12.0).as_text(), "12");
        assert_eq!(Cell::Number(12.5).as_text(), "12.5");
        assert_eq!(Cell::from(&Data::Int(7)).as_text(), "7");
        assert_eq!(Cell::from(&Data::Empty), Cell::Empty);
    }

    #[test]
    fn test_missing_file_yields_empty_sheet() {
        let dir = TempDir::new().unwrap();
        assert!(find_sheet_file(dir.path(), "hospitais").is_none());
        let sheet = read_data_sheet(dir.path(), "hospitais").unwrap();
        assert!(sheet.is_empty());
        assert!(sheet.headers.is_empty());
    }

    #[test]
    fn test_find_sheet_file_prefers_workbook_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("contatos.csv"), "NOME_CONTATO\nAna\n").unwrap();
        std::fs::write(dir.path().join("contatos.xlsx"), b"not really a workbook").unwrap();
        let found = find_sheet_file(dir.path(), "contatos").unwrap();
        assert_eq!(found.extension().unwrap(), "xlsx");
    }
}
