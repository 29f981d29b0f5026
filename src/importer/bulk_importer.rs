// ==========================================
// Nutri Hospital - Bulk import orchestrator
// ==========================================
// Phases (one transaction each, committed before the next starts):
//   NOT_STARTED -> flag set? -> DONE (no-op, "already imported")
//   HOSPITALS   -> create by name, keep source id when free (rows with an
//                  id first)
//   CONTACTS    -> reconcile, persist (unassociated allowed)
//   SURVEY      -> reconcile, upsert (unresolved skipped)
//   PRODUCTS    -> reconcile, add or increment (unresolved skipped)
//   FINALIZING  -> insert flag + summary
// A storage error rolls back the running phase only and leaves the flag
// unset; rerunning is safe because hospitals are matched by name.
// ==========================================

use crate::config::ImportSettings;
use crate::domain::{
    EntityCounts, ImportPhase, ImportSummary, NewContact, NewHospital, NewHospitalProduct,
    IMPORT_DONE_KEY,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::identity_reconciler::IdentityReconciler;
use crate::importer::importer_trait::{BulkImporter, SheetLoader};
use crate::importer::loaders::{
    ContactRecord, ContactSheetLoader, HospitalSheetLoader, ProductRecord, ProductSheetLoader,
    SheetLoad, SurveyRecord, SurveySheetLoader,
};
use crate::repository::{
    ContactRepository, HospitalRepository, ImportFlagRepository, ProductRepository,
    ProductWrite, RepositoryError, RepositoryResult, ResetCounts, SurveyRepository, SurveyWrite,
};
use async_trait::async_trait;
use rusqlite::Connection;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Normalized content of the four input sheets.
#[derive(Debug, Clone, Default)]
pub struct SourceSheets {
    pub hospitals: SheetLoad<NewHospital>,
    pub contacts: SheetLoad<ContactRecord>,
    pub survey: SheetLoad<SurveyRecord>,
    pub products: SheetLoad<ProductRecord>,
}

fn counts_for<T>(load: &SheetLoad<T>) -> EntityCounts {
    EntityCounts {
        read: load.records.len(),
        dropped: load.dropped_rows,
        ..Default::default()
    }
}

/// Run `f` in its own transaction; any error rolls it back.
fn in_phase<T>(
    conn: &Connection,
    phase: ImportPhase,
    f: impl FnOnce(&Connection) -> RepositoryResult<T>,
) -> ImportResult<T> {
    let result = conn
        .unchecked_transaction()
        .map_err(RepositoryError::from)
        .and_then(|tx| {
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        });

    result.map_err(|e| {
        error!(phase = %phase, error = %e, "import phase failed, rolled back");
        ImportError::in_phase(phase)(e)
    })
}

// ==========================================
// BulkImportService
// ==========================================
pub struct BulkImportService {
    conn: Arc<Mutex<Connection>>,
    settings: ImportSettings,

    hospital_loader: HospitalSheetLoader,
    contact_loader: ContactSheetLoader,
    survey_loader: SurveySheetLoader,
    product_loader: ProductSheetLoader,
}

impl BulkImportService {
    pub fn new(conn: Arc<Mutex<Connection>>, settings: ImportSettings) -> Self {
        Self {
            hospital_loader: HospitalSheetLoader::new(settings.hospitals_file.clone()),
            contact_loader: ContactSheetLoader::new(settings.contacts_file.clone()),
            survey_loader: SurveySheetLoader::new(settings.survey_file.clone()),
            product_loader: ProductSheetLoader::new(settings.products_file.clone()),
            conn,
            settings,
        }
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    fn get_conn(&self) -> ImportResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ImportError::Repository(RepositoryError::LockError(e.to_string())))
    }

    /// Read and normalize all four sheets from the data directory.
    pub fn load_sources(&self) -> ImportResult<SourceSheets> {
        let dir = self.settings.data_dir();
        Ok(SourceSheets {
            hospitals: self.hospital_loader.load(dir)?,
            contacts: self.contact_loader.load(dir)?,
            survey: self.survey_loader.load(dir)?,
            products: self.product_loader.load(dir)?,
        })
    }

    #[instrument(name = "bulk_import", skip(self, run_id), fields(run_id = %run_id))]
    fn run_blocking(&self, run_id: String) -> ImportResult<ImportSummary> {
        let start = Instant::now();
        let conn = self.get_conn()?;

        let done = ImportFlagRepository::find_tx(&conn, IMPORT_DONE_KEY)?
            .map(|flag| flag.is_done())
            .unwrap_or(false);
        if done {
            warn!("bulk import already done, nothing to do");
            return Ok(ImportSummary::already_imported(run_id));
        }

        info!(data_dir = %self.settings.data_dir().display(), "bulk import started");
        let sources = self.load_sources()?;
        info!(
            hospitals = sources.hospitals.records.len(),
            contacts = sources.contacts.records.len(),
            survey = sources.survey.records.len(),
            products = sources.products.records.len(),
            "sheets loaded"
        );

        let mut summary = ImportSummary {
            run_id,
            ..Default::default()
        };

        let (hospitals, reconciler) = in_phase(&conn, ImportPhase::Hospitals, |tx| {
            let mut reconciler =
                IdentityReconciler::from_hospitals(&HospitalRepository::list_tx(tx)?);
            let counts = import_hospitals(tx, &sources.hospitals, &mut reconciler)?;
            Ok((counts, reconciler))
        })?;
        summary.hospitals = hospitals;
        info!(phase = %ImportPhase::Hospitals, counts = %summary.hospitals, "phase committed");

        summary.contacts = in_phase(&conn, ImportPhase::Contacts, |tx| {
            import_contacts(tx, &sources.contacts, &reconciler)
        })?;
        info!(phase = %ImportPhase::Contacts, counts = %summary.contacts, "phase committed");

        summary.survey = in_phase(&conn, ImportPhase::Survey, |tx| {
            import_survey(tx, &sources.survey, &reconciler)
        })?;
        info!(phase = %ImportPhase::Survey, counts = %summary.survey, "phase committed");

        summary.products = in_phase(&conn, ImportPhase::Products, |tx| {
            import_products(tx, &sources.products, &reconciler)
        })?;
        info!(phase = %ImportPhase::Products, counts = %summary.products, "phase committed");

        summary.elapsed_ms = start.elapsed().as_millis() as u64;
        in_phase(&conn, ImportPhase::Finalizing, |tx| finalize(tx, &summary))?;

        info!(elapsed_ms = summary.elapsed_ms, "bulk import done");
        Ok(summary)
    }

    fn reset_blocking(&self) -> ImportResult<ResetCounts> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction().map_err(RepositoryError::from)?;
        let counts = ImportFlagRepository::reset_all_tx(&tx)?;
        tx.commit().map_err(RepositoryError::from)?;
        warn!(
            hospitals = counts.hospitals,
            contacts = counts.contacts,
            survey = counts.survey,
            products = counts.products,
            "database reset, import flag cleared"
        );
        Ok(counts)
    }
}

#[async_trait]
impl BulkImporter for BulkImportService {
    async fn run_import(&self) -> ImportResult<ImportSummary> {
        self.run_blocking(Uuid::new_v4().to_string())
    }

    async fn is_import_done(&self) -> ImportResult<bool> {
        let conn = self.get_conn()?;
        let flag = ImportFlagRepository::find_tx(&conn, IMPORT_DONE_KEY)?;
        Ok(flag.map(|f| f.is_done()).unwrap_or(false))
    }

    async fn reset(&self) -> ImportResult<ResetCounts> {
        self.reset_blocking()
    }
}

// ==========================================
// Phase bodies
// ==========================================

fn import_hospitals(
    conn: &Connection,
    load: &SheetLoad<NewHospital>,
    reconciler: &mut IdentityReconciler,
) -> RepositoryResult<EntityCounts> {
    let mut counts = counts_for(load);
    // source ids already mapped in this run; the first row wins
    let mut claimed: HashSet<i64> = HashSet::new();

    // rows carrying a source id go first so an auto-assigned id never takes
    // one of them
    let with_id = load.records.iter().filter(|r| r.id.is_some());
    let without_id = load.records.iter().filter(|r| r.id.is_none());

    for record in with_id.chain(without_id) {
        let name = record.nome_hospital.trim();

        if let Some(existing) = reconciler.find_by_name(name) {
            counts.skipped += 1;
            if let Some(source_id) = record.id {
                if claimed.insert(source_id) {
                    reconciler.add_alias(source_id, existing);
                }
            }
            debug!(name, existing, "hospital exists, skipped");
            continue;
        }

        let keep_source_id = match record.id {
            Some(source_id) => {
                !claimed.contains(&source_id) && !HospitalRepository::exists_tx(conn, source_id)?
            }
            None => false,
        };
        let new = NewHospital {
            id: if keep_source_id { record.id } else { None },
            ..record.clone()
        };
        let id = HospitalRepository::insert_tx(conn, &new)?;
        reconciler.register(id, name);
        counts.created += 1;

        if let Some(source_id) = record.id {
            if claimed.insert(source_id) {
                reconciler.add_alias(source_id, id);
            } else {
                warn!(source_id, name, "duplicate source id in hospitals sheet");
            }
            if source_id != id {
                debug!(source_id, id, "source id taken, hospital stored under a new id");
            }
        }
    }
    Ok(counts)
}

fn import_contacts(
    conn: &Connection,
    load: &SheetLoad<ContactRecord>,
    reconciler: &IdentityReconciler,
) -> RepositoryResult<EntityCounts> {
    let mut counts = counts_for(load);

    for record in &load.records {
        let hospital_id = reconciler
            .resolve(record.hospital_id, &record.hospital_nome)
            .hospital_id();
        let hospital_nome = hospital_id
            .and_then(|id| reconciler.name_of(id))
            .map(str::to_string)
            .unwrap_or_else(|| record.hospital_nome.clone());

        ContactRepository::insert_tx(
            conn,
            &NewContact {
                hospital_id,
                hospital_nome,
                nome_contato: record.nome_contato.clone(),
                cargo: record.cargo.clone(),
                telefone: record.telefone.clone(),
            },
        )?;
        counts.created += 1;
        if hospital_id.is_none() {
            counts.unassociated += 1;
            debug!(
                contact = %record.nome_contato,
                hospital = %record.hospital_nome,
                "contact unassociated"
            );
        }
    }
    Ok(counts)
}

fn import_survey(
    conn: &Connection,
    load: &SheetLoad<SurveyRecord>,
    reconciler: &IdentityReconciler,
) -> RepositoryResult<EntityCounts> {
    let mut counts = counts_for(load);

    for record in &load.records {
        // by id only; the name column never links a questionnaire
        let Some(hospital_id) = reconciler.resolve(Some(record.hospital_id), "").hospital_id()
        else {
            counts.skipped += 1;
            debug!(
                source_id = record.hospital_id,
                hospital = %record.hospital_nome,
                "survey row without hospital, skipped"
            );
            continue;
        };

        match SurveyRepository::upsert_tx(conn, hospital_id, &record.answers)? {
            SurveyWrite::Created(_) => counts.created += 1,
            SurveyWrite::Updated(_) => counts.updated += 1,
        }
    }
    Ok(counts)
}

fn import_products(
    conn: &Connection,
    load: &SheetLoad<ProductRecord>,
    reconciler: &IdentityReconciler,
) -> RepositoryResult<EntityCounts> {
    let mut counts = counts_for(load);

    for record in &load.records {
        let Some(hospital_id) = reconciler
            .resolve(record.hospital_id, &record.nome_hospital)
            .hospital_id()
        else {
            counts.skipped += 1;
            debug!(
                produto = %record.produto,
                source_id = ?record.hospital_id,
                "product without hospital, skipped"
            );
            continue;
        };

        let product = NewHospitalProduct {
            hospital_id,
            nome_hospital: reconciler
                .name_of(hospital_id)
                .unwrap_or(&record.nome_hospital)
                .to_string(),
            marca_planilha: record.marca_planilha.clone(),
            produto: record.produto.clone(),
            quantidade: record.quantidade,
            facts: record.facts.clone(),
        };
        match ProductRepository::add_or_increment_tx(conn, &product)? {
            ProductWrite::Created(_) => counts.created += 1,
            ProductWrite::Incremented(_) => counts.updated += 1,
        }
    }
    Ok(counts)
}

fn finalize(conn: &Connection, summary: &ImportSummary) -> RepositoryResult<()> {
    match ImportFlagRepository::insert_done_flag_tx(conn) {
        Ok(_) => {}
        Err(RepositoryError::UniqueConstraintViolation(msg)) => {
            warn!(detail = %msg, "import flag already set by a concurrent run");
        }
        Err(e) => return Err(e),
    }
    ImportFlagRepository::upsert_summary_tx(conn, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, ensure_schema};
    use crate::domain::Hospital;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        ensure_schema(&conn).unwrap();
        conn
    }

    fn hospitals(rows: &[(Option<i64>, &str)]) -> SheetLoad<NewHospital> {
        SheetLoad {
            records: rows
                .iter()
                .map(|(id, name)| NewHospital {
                    id: *id,
                    ..NewHospital::named(*name)
                })
                .collect(),
            total_rows: rows.len(),
            dropped_rows: 0,
        }
    }

    fn stored(conn: &Connection) -> Vec<Hospital> {
        HospitalRepository::list_tx(conn).unwrap()
    }

    #[test]
    fn test_hospital_phase_keeps_free_source_ids() {
        let conn = conn();
        let mut reconciler = IdentityReconciler::default();
        let counts = import_hospitals(
            &conn,
            &hospitals(&[(Some(5), "Hospital Sao Lucas"), (None, "Hospital B")]),
            &mut reconciler,
        )
        .unwrap();

        assert_eq!(counts.created, 2);
        let all = stored(&conn);
        assert!(all.iter().any(|h| h.id == 5 && h.nome_hospital == "Hospital Sao Lucas"));
    }

    #[test]
    fn test_rows_without_id_never_take_a_source_id() {
        let conn = conn();
        let mut reconciler = IdentityReconciler::default();
        import_hospitals(
            &conn,
            &hospitals(&[(None, "Hospital Sem Id"), (Some(1), "Hospital Um")]),
            &mut reconciler,
        )
        .unwrap();

        let all = stored(&conn);
        assert!(all.iter().any(|h| h.id == 1 && h.nome_hospital == "Hospital Um"));
        assert!(all.iter().any(|h| h.id != 1 && h.nome_hospital == "Hospital Sem Id"));
        assert_eq!(reconciler.resolve(Some(1), "").hospital_id(), Some(1));
    }

    #[test]
    fn test_survey_rows_are_not_linked_by_name() {
        let conn = conn();
        let mut reconciler = IdentityReconciler::default();
        import_hospitals(
            &conn,
            &hospitals(&[(Some(5), "Hospital A")]),
            &mut reconciler,
        )
        .unwrap();

        let load = SheetLoad {
            records: vec![SurveyRecord {
                hospital_id: 999,
                hospital_nome: "hospital a".to_string(),
                ..Default::default()
            }],
            total_rows: 1,
            dropped_rows: 0,
        };
        let counts = import_survey(&conn, &load, &reconciler).unwrap();

        assert_eq!(counts.created, 0);
        assert_eq!(counts.skipped, 1);
        assert!(SurveyRepository::find_by_hospital_tx(&conn, 5).unwrap().is_none());
    }

    #[test]
    fn test_hospital_phase_is_idempotent_by_name() {
        let conn = conn();
        let load = hospitals(&[(Some(5), "Hospital Sao Lucas")]);

        let mut first = IdentityReconciler::default();
        import_hospitals(&conn, &load, &mut first).unwrap();

        let mut second = IdentityReconciler::from_hospitals(&stored(&conn));
        let counts = import_hospitals(&conn, &load, &mut second).unwrap();

        assert_eq!(counts.created, 0);
        assert_eq!(counts.skipped, 1);
        assert_eq!(stored(&conn).len(), 1);
    }

    #[test]
    fn test_taken_source_id_gets_an_alias() {
        let conn = conn();
        HospitalRepository::insert_tx(
            &conn,
            &NewHospital {
                id: Some(5),
                ..NewHospital::named("Outro Hospital")
            },
        )
        .unwrap();

        let mut reconciler = IdentityReconciler::from_hospitals(&stored(&conn));
        import_hospitals(
            &conn,
            &hospitals(&[(Some(5), "Hospital Novo")]),
            &mut reconciler,
        )
        .unwrap();

        let new_id = reconciler.find_by_name("hospital novo").unwrap();
        assert_ne!(new_id, 5);
        assert_eq!(reconciler.resolve(Some(5), "").hospital_id(), Some(new_id));
    }

    #[test]
    fn test_duplicate_source_id_keeps_first_mapping() {
        let conn = conn();
        let mut reconciler = IdentityReconciler::default();
        import_hospitals(
            &conn,
            &hospitals(&[(Some(5), "Hospital A"), (Some(5), "Hospital B")]),
            &mut reconciler,
        )
        .unwrap();

        assert_eq!(stored(&conn).len(), 2);
        assert_eq!(reconciler.resolve(Some(5), "").hospital_id(), Some(5));
    }

    #[test]
    fn test_failed_phase_rolls_back() {
        let conn = conn();
        let result: ImportResult<()> = in_phase(&conn, ImportPhase::Contacts, |tx| {
            HospitalRepository::insert_tx(tx, &NewHospital::named("Hospital A"))?;
            HospitalRepository::insert_tx(tx, &NewHospital::named(""))?;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(ImportError::PhaseFailed {
                phase: ImportPhase::Contacts,
                ..
            })
        ));
        assert!(stored(&conn).is_empty());
    }
}
