// ==========================================
// Nutri Hospital - Contacts sheet loader
// ==========================================
// Mandatory: contact name. The hospital is referenced by id and/or name;
// reconciliation happens later, in the contacts phase.
// ==========================================

use crate::importer::column_resolver::ColumnSpec;
use crate::importer::file_parser::Sheet;
use crate::importer::importer_trait::SheetLoader;
use crate::importer::loaders::{normalize_rows, SheetLoad};

const HOSPITAL_ID: &str = "hospital_id";
const HOSPITAL_NAME: &str = "hospital_nome";
const CONTACT_NAME: &str = "nome_contato";
const ROLE: &str = "cargo";
const PHONE: &str = "telefone";

fn column_specs() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(HOSPITAL_ID, &["ID_HOSPITAL", "HOSPITAL_ID"]).contains(&["ID_HOSP"]),
        ColumnSpec::new(HOSPITAL_NAME, &["HOSPITAL_NOME", "NOME_HOSPITAL"]).contains(&["HOSPITAL"]),
        ColumnSpec::new(CONTACT_NAME, &["NOME_CONTATO", "CONTATO"])
            .contains(&["CONTATO", "NOME"])
            .critical(),
        ColumnSpec::new(ROLE, &["CARGO"]),
        ColumnSpec::new(PHONE, &["TELEFONE", "TEL"]).contains(&["TEL"]),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactRecord {
    pub hospital_id: Option<i64>,
    pub hospital_nome: String,
    pub nome_contato: String,
    pub cargo: String,
    pub telefone: String,
}

pub struct ContactSheetLoader {
    file_stem: String,
}

impl ContactSheetLoader {
    pub fn new(file_stem: impl Into<String>) -> Self {
        Self {
            file_stem: file_stem.into(),
        }
    }
}

impl SheetLoader for ContactSheetLoader {
    type Record = ContactRecord;

    fn file_stem(&self) -> &str {
        &self.file_stem
    }

    fn load_sheet(&self, sheet: &Sheet) -> SheetLoad<ContactRecord> {
        normalize_rows(sheet, &column_specs(), CONTACT_NAME, |row| ContactRecord {
            hospital_id: row.id(HOSPITAL_ID),
            hospital_nome: row.text(HOSPITAL_NAME),
            nome_contato: row.text(CONTACT_NAME),
            cargo: row.text(ROLE),
            telefone: row.text(PHONE),
        })
    }
}
