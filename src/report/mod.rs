// ==========================================
// Nutri Hospital - Reporting layer
// ==========================================
// Read-only views over the stored data: per-hospital text report,
// overview totals, CSV export.
// ==========================================

pub mod csv_export;
pub mod error;
pub mod hospital_report;
pub mod overview;

pub use csv_export::{export_all, ExportSummary};
pub use error::{ReportError, ReportResult};
pub use hospital_report::HospitalReport;
pub use overview::OverviewReport;

use crate::repository::{ContactRepository, HospitalRepository, ProductRepository, SurveyRepository};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub struct ReportService {
    hospital_repo: HospitalRepository,
    contact_repo: ContactRepository,
    survey_repo: SurveyRepository,
    product_repo: ProductRepository,
}

impl ReportService {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            hospital_repo: HospitalRepository::new(conn.clone()),
            contact_repo: ContactRepository::new(conn.clone()),
            survey_repo: SurveyRepository::new(conn.clone()),
            product_repo: ProductRepository::new(conn),
        }
    }

    /// Report of one hospital. The questionnaire is not created when absent.
    pub fn hospital_report(&self, hospital_id: i64) -> ReportResult<HospitalReport> {
        let hospital = self
            .hospital_repo
            .find_by_id(hospital_id)?
            .ok_or(ReportError::HospitalNotFound(hospital_id))?;
        Ok(HospitalReport {
            contacts: self.contact_repo.list_by_hospital(hospital_id)?,
            survey: self.survey_repo.find_by_hospital(hospital_id)?,
            products: self.product_repo.list_by_hospital(hospital_id)?,
            hospital,
        })
    }

    pub fn overview(&self) -> ReportResult<OverviewReport> {
        let hospitals = self.hospital_repo.count()?;
        Ok(OverviewReport::from_records(
            usize::try_from(hospitals).unwrap_or(0),
            &self.contact_repo.list()?,
            &self.product_repo.list()?,
        ))
    }

    pub fn export_csv(&self, out_dir: &Path) -> ReportResult<ExportSummary> {
        export_all(
            out_dir,
            &self.hospital_repo.list()?,
            &self.contact_repo.list()?,
            &self.product_repo.list()?,
            &self.survey_repo.list()?,
        )
    }
}
