// ==========================================
// Nutri Hospital - Survey sheet loader
// ==========================================
// Mandatory: a usable hospital id. Questionnaire columns are matched
// exactly by their question text (the header IS the prompt) or by their
// storage key. Any other non-blank header is kept in the overflow map.
// ==========================================

use crate::domain::{SurveyAnswers, SurveyField};
use crate::importer::column_resolver::{ColumnSpec, ResolvedColumns};
use crate::importer::file_parser::Sheet;
use crate::importer::importer_trait::SheetLoader;
use crate::importer::loaders::{normalize_with_columns, SheetLoad};
use crate::importer::row_normalizer::{normalize_text, RowView};

const HOSPITAL_ID: &str = "hospital_id";
const HOSPITAL_NAME: &str = "nome_hospital";

fn column_specs() -> Vec<ColumnSpec> {
    let mut specs = vec![
        ColumnSpec::new(HOSPITAL_ID, &["ID_HOSPITAL", "HOSPITAL_ID"]).contains(&["ID_HOSP"]),
        // claimed so it stays out of the overflow map; never used for linking.
        // exact only: question headers mention "hospital" too
        ColumnSpec::new(HOSPITAL_NAME, &["NOME_HOSPITAL", "HOSPITAL_NOME"]),
    ];
    specs.extend(
        SurveyField::ALL
            .iter()
            .map(|field| ColumnSpec::new(field.key(), &[field.question(), field.key()])),
    );
    specs
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyRecord {
    pub hospital_id: i64,
    pub hospital_nome: String,
    pub answers: SurveyAnswers,
}

pub struct SurveySheetLoader {
    file_stem: String,
}

impl SurveySheetLoader {
    pub fn new(file_stem: impl Into<String>) -> Self {
        Self {
            file_stem: file_stem.into(),
        }
    }
}

impl SheetLoader for SurveySheetLoader {
    type Record = SurveyRecord;

    fn file_stem(&self) -> &str {
        &self.file_stem
    }

    fn load_sheet(&self, sheet: &Sheet) -> SheetLoad<SurveyRecord> {
        let columns = ResolvedColumns::resolve(&sheet.headers, &column_specs());
        let overflow: Vec<(usize, String)> = columns
            .unclaimed()
            .into_iter()
            .map(|(idx, header)| (idx, header.trim().to_string()))
            .collect();

        let load = normalize_with_columns(sheet, &columns, HOSPITAL_ID, &mut |row: &RowView<'_>| {
            let hospital_id = row.id(HOSPITAL_ID)?;
            let mut answers = SurveyAnswers::default();
            for field in SurveyField::ALL {
                answers.set(field, row.text(field.key()));
            }
            for (idx, header) in &overflow {
                let value = normalize_text(row.cell_at(*idx));
                if !value.is_empty() {
                    answers.extras.insert(header.clone(), value);
                }
            }
            Some(SurveyRecord {
                hospital_id,
                hospital_nome: row.text(HOSPITAL_NAME),
                answers,
            })
        });

        // ids that are not positive integers count as missing
        let kept = load.records.len();
        let records: Vec<SurveyRecord> = load.records.into_iter().flatten().collect();
        SheetLoad {
            dropped_rows: load.dropped_rows + (kept - records.len()),
            total_rows: load.total_rows,
            records,
        }
    }
}
