// ==========================================
// Nutri Hospital - CSV export
// ==========================================
// One comma-separated file per table, header row always written.
// Files are named after the default import stems and use headers the
// importer recognises, so an export directory can seed an empty database.
// ==========================================

use crate::config::import_settings::{
    DEFAULT_CONTACTS_FILE, DEFAULT_HOSPITALS_FILE, DEFAULT_PRODUCTS_FILE, DEFAULT_SURVEY_FILE,
};
use crate::domain::{Contact, Hospital, HospitalProduct, NutritionFacts, SurveyData, SurveyField};
use crate::report::error::{ReportError, ReportResult};
use csv::WriterBuilder;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

/// `<out_dir>/<stem>.csv`
pub fn csv_path(out_dir: &Path, stem: &str) -> PathBuf {
    out_dir.join(format!("{stem}.csv"))
}

#[derive(Debug, Serialize)]
struct HospitalRow<'a> {
    id: i64,
    nome_hospital: &'a str,
    endereco: &'a str,
    numero: &'a str,
    complemento: &'a str,
    cep: &'a str,
    cidade: &'a str,
    estado: &'a str,
}

const HOSPITAL_HEADER: [&str; 8] = [
    "id",
    "nome_hospital",
    "endereco",
    "numero",
    "complemento",
    "cep",
    "cidade",
    "estado",
];

impl<'a> From<&'a Hospital> for HospitalRow<'a> {
    fn from(h: &'a Hospital) -> Self {
        Self {
            id: h.id,
            nome_hospital: &h.nome_hospital,
            endereco: &h.endereco,
            numero: &h.numero,
            complemento: &h.complemento,
            cep: &h.cep,
            cidade: &h.cidade,
            estado: &h.estado,
        }
    }
}

#[derive(Debug, Serialize)]
struct ContactRow<'a> {
    id: i64,
    hospital_id: Option<i64>,
    hospital_nome: &'a str,
    nome_contato: &'a str,
    cargo: &'a str,
    telefone: &'a str,
}

const CONTACT_HEADER: [&str; 6] = [
    "id",
    "hospital_id",
    "hospital_nome",
    "nome_contato",
    "cargo",
    "telefone",
];

impl<'a> From<&'a Contact> for ContactRow<'a> {
    fn from(c: &'a Contact) -> Self {
        Self {
            id: c.id,
            hospital_id: c.hospital_id,
            hospital_nome: &c.hospital_nome,
            nome_contato: &c.nome_contato,
            cargo: &c.cargo,
            telefone: &c.telefone,
        }
    }
}

/// Counts of rows written per file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub hospitals: usize,
    pub contacts: usize,
    pub products: usize,
    pub survey: usize,
    pub files: Vec<PathBuf>,
}

fn writer_for(path: &Path) -> ReportResult<csv::Writer<std::fs::File>> {
    WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(ReportError::export(path))
}

fn write_serialized<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = T>,
) -> ReportResult<usize> {
    let mut wtr = writer_for(path)?;
    wtr.write_record(header).map_err(ReportError::export(path))?;
    let mut written = 0;
    for row in rows {
        wtr.serialize(row).map_err(ReportError::export(path))?;
        written += 1;
    }
    wtr.flush().map_err(ReportError::export(path))?;
    Ok(written)
}

fn write_products(path: &Path, products: &[HospitalProduct]) -> ReportResult<usize> {
    let mut header = vec![
        "id",
        "hospital_id",
        "nome_hospital",
        "marca_planilha",
        "produto",
        "quantidade",
    ];
    header.extend(NutritionFacts::KEYS);

    let mut wtr = writer_for(path)?;
    wtr.write_record(&header).map_err(ReportError::export(path))?;
    for p in products {
        let mut record = vec![
            p.id.to_string(),
            p.hospital_id.to_string(),
            p.nome_hospital.clone(),
            p.marca_planilha.clone(),
            p.produto.clone(),
            p.quantidade.to_string(),
        ];
        record.extend(p.facts.values().iter().map(|v| v.to_string()));
        wtr.write_record(&record).map_err(ReportError::export(path))?;
    }
    wtr.flush().map_err(ReportError::export(path))?;
    Ok(products.len())
}

/// Questionnaire columns by storage key, then one column per overflow
/// header found in any row.
fn write_survey(path: &Path, surveys: &[SurveyData]) -> ReportResult<usize> {
    let extra_headers: BTreeSet<&str> = surveys
        .iter()
        .flat_map(|s| s.data.extras.keys().map(String::as_str))
        .collect();

    let mut header = vec!["id_hospital"];
    header.extend(SurveyField::ALL.iter().map(|f| f.key()));
    header.extend(extra_headers.iter().copied());

    let mut wtr = writer_for(path)?;
    wtr.write_record(&header).map_err(ReportError::export(path))?;
    for survey in surveys {
        let mut record = vec![survey.hospital_id.to_string()];
        record.extend(SurveyField::ALL.iter().map(|f| survey.get(*f).to_string()));
        record.extend(extra_headers.iter().map(|h| {
            survey.data.extras.get(*h).cloned().unwrap_or_default()
        }));
        wtr.write_record(&record).map_err(ReportError::export(path))?;
    }
    wtr.flush().map_err(ReportError::export(path))?;
    Ok(surveys.len())
}

/// Write the four tables into `out_dir`, creating it when missing.
pub fn export_all(
    out_dir: &Path,
    hospitals: &[Hospital],
    contacts: &[Contact],
    products: &[HospitalProduct],
    surveys: &[SurveyData],
) -> ReportResult<ExportSummary> {
    std::fs::create_dir_all(out_dir).map_err(ReportError::export(out_dir))?;

    let hospitals_path = csv_path(out_dir, DEFAULT_HOSPITALS_FILE);
    let contacts_path = csv_path(out_dir, DEFAULT_CONTACTS_FILE);
    let products_path = csv_path(out_dir, DEFAULT_PRODUCTS_FILE);
    let survey_path = csv_path(out_dir, DEFAULT_SURVEY_FILE);

    let summary = ExportSummary {
        hospitals: write_serialized(
            &hospitals_path,
            &HOSPITAL_HEADER,
            hospitals.iter().map(HospitalRow::from),
        )?,
        contacts: write_serialized(
            &contacts_path,
            &CONTACT_HEADER,
            contacts.iter().map(ContactRow::from),
        )?,
        products: write_products(&products_path, products)?,
        survey: write_survey(&survey_path, surveys)?,
        files: vec![hospitals_path, contacts_path, products_path, survey_path],
    };

    info!(
        dir = %out_dir.display(),
        hospitals = summary.hospitals,
        contacts = summary.contacts,
        products = summary.products,
        survey = summary.survey,
        "csv export written"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewHospital, SurveyAnswers};
    use tempfile::TempDir;

    fn read(dir: &TempDir, stem: &str) -> String {
        std::fs::read_to_string(csv_path(dir.path(), stem)).unwrap()
    }

    #[test]
    fn test_empty_export_still_writes_headers() {
        let dir = TempDir::new().unwrap();
        let summary = export_all(dir.path(), &[], &[], &[], &[]).unwrap();
        assert_eq!(summary.files.len(), 4);
        let names: Vec<_> = summary
            .files
            .iter()
            .filter_map(|f| f.file_name()?.to_str())
            .collect();
        assert_eq!(
            names,
            vec!["hospitais.csv", "contatos.csv", "produtoshospitais.csv", "dadoshospitais.csv"]
        );

        let text = read(&dir, DEFAULT_HOSPITALS_FILE);
        assert_eq!(text.trim_end(), HOSPITAL_HEADER.join(","));
        let text = read(&dir, DEFAULT_SURVEY_FILE);
        assert!(text.starts_with("id_hospital,especialidade,"));
        assert!(text.trim_end().ends_with("nova_etapa_negociacao"));
    }

    #[test]
    fn test_rows_are_quoted_and_complete() {
        let dir = TempDir::new().unwrap();
        let hospital = NewHospital {
            nome_hospital: "Hospital Sao Lucas, Unidade 2".to_string(),
            ..Default::default()
        }
        .into_hospital(5);
        let contact = Contact {
            id: 1,
            hospital_id: None,
            hospital_nome: "Hospital Fantasma".to_string(),
            nome_contato: "Bruno".to_string(),
            cargo: String::new(),
            telefone: String::new(),
        };
        let mut answers = SurveyAnswers::default();
        answers.set(SurveyField::Leitos, "120");
        answers.extras.insert("Observação".to_string(), "ligar cedo".to_string());
        let survey = SurveyData {
            id: 1,
            hospital_id: 5,
            data: answers,
        };

        let summary = export_all(dir.path(), &[hospital], &[contact], &[], &[survey]).unwrap();
        assert_eq!(summary.hospitals, 1);
        assert_eq!(summary.survey, 1);

        let hospitals = read(&dir, DEFAULT_HOSPITALS_FILE);
        assert!(hospitals.contains("5,\"Hospital Sao Lucas, Unidade 2\","));
        let contacts = read(&dir, DEFAULT_CONTACTS_FILE);
        assert!(contacts.contains("1,,Hospital Fantasma,Bruno,,"));
        let surveys = read(&dir, DEFAULT_SURVEY_FILE);
        assert!(surveys.lines().next().unwrap().ends_with(",Observação"));
        assert!(surveys.contains("5,,120,"));
        assert!(surveys.trim_end().ends_with(",ligar cedo"));
    }
}
