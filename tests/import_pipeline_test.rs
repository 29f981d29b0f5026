// ==========================================
// Bulk import integration tests
// ==========================================
// Sheets on disk -> BulkImportService -> SQLite, checked through the
// repositories.
// ==========================================


use nutri_hospital::config::ImportSettings;
use nutri_hospital::domain::{ImportPhase, SurveyField};
use nutri_hospital::importer::{BulkImportService, BulkImporter, ImportError};
use nutri_hospital::logging;
use nutri_hospital::repository::{
    ContactRepository, HospitalRepository, ImportFlagRepository, ProductRepository,
    SurveyRepository,
};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use test_helpers::{count_rows, create_test_db, sample_data_dir, write_sheet};

fn importer(conn: &Arc<Mutex<Connection>>, dir: &TempDir) -> BulkImportService {
    BulkImportService::new(conn.clone(), ImportSettings::with_data_dir(dir.path()))
}

#[tokio::test]
async fn test_full_import_links_records_to_hospitals() {
    logging::init_test();
    let (_db, conn) = create_test_db().unwrap();
    let data = sample_data_dir();

    let summary = importer(&conn, &data).run_import().await.unwrap();
    assert!(!summary.already_imported);
    assert!(!summary.run_id.is_empty());

    // hospitals: blank name dropped, source id 5 preserved
    assert_eq!(summary.hospitals.created, 2);
    assert_eq!(summary.hospitals.dropped, 1);
    let hospitals = HospitalRepository::new(conn.clone());
    let sao_lucas = hospitals.find_by_id(5).unwrap().unwrap();
    assert_eq!(sao_lucas.nome_hospital, "Hospital Sao Lucas");
    assert_eq!(sao_lucas.endereco, "Rua A");
    let santa_clara = hospitals
        .list()
        .unwrap()
        .into_iter()
        .find(|h| h.nome_hospital == "Hospital Santa Clara")
        .unwrap();

    // contacts: Ana by id, Bruno by name, Carla unassociated, blank name dropped
    assert_eq!(summary.contacts.created, 3);
    assert_eq!(summary.contacts.dropped, 1);
    assert_eq!(summary.contacts.unassociated, 1);
    let contacts = ContactRepository::new(conn.clone());
    let ana = contacts.list_by_hospital(5).unwrap();
    assert_eq!(ana.len(), 1);
    assert_eq!(ana[0].nome_contato, "Ana");
    let bruno = contacts.list_by_hospital(santa_clara.id).unwrap();
    assert_eq!(bruno[0].nome_contato, "Bruno");
    assert_eq!(bruno[0].hospital_nome, "Hospital Santa Clara");
    let carla = contacts.list_unassociated().unwrap();
    assert_eq!(carla[0].nome_contato, "Carla");
    assert_eq!(carla[0].hospital_nome, "Hospital Fantasma");
    assert_eq!(carla[0].telefone, "");

    // survey: id "5.0" resolves, unknown header kept as extra
    assert_eq!(summary.survey.created, 1);
    let survey = SurveyRepository::new(conn.clone())
        .find_by_hospital(5)
        .unwrap()
        .unwrap();
    assert_eq!(survey.get(SurveyField::Leitos), "120");
    assert_eq!(survey.get(SurveyField::Fornecedor), "Prodiet");
    assert_eq!(
        survey.data.extras.get("Observação").map(String::as_str),
        Some("ligar cedo")
    );

    // products: unknown hospital 999 skipped, lenient quantities
    assert_eq!(summary.products.created, 3);
    assert_eq!(summary.products.skipped, 1);
    let products = ProductRepository::new(conn.clone());
    let at_5 = products.list_by_hospital(5).unwrap();
    let formula_x = at_5.iter().find(|p| p.produto == "Formula X").unwrap();
    assert_eq!(formula_x.quantidade, 12);
    assert_eq!(formula_x.facts.kcal, "150");
    let formula_y = at_5.iter().find(|p| p.produto == "Formula Y").unwrap();
    assert_eq!(formula_y.quantidade, 0);
    let at_clara = products.list_by_hospital(santa_clara.id).unwrap();
    assert_eq!(at_clara[0].quantidade, 0);
    assert_eq!(count_rows(&conn, "produtos_hospitais"), 3);

    let flags = ImportFlagRepository::new(conn.clone());
    assert!(flags.is_import_done().unwrap());
    assert_eq!(flags.last_summary().unwrap(), Some(summary));
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let (_db, conn) = create_test_db().unwrap();
    let data = sample_data_dir();
    let service = importer(&conn, &data);

    service.run_import().await.unwrap();
    let before = (
        count_rows(&conn, "hospitais"),
        count_rows(&conn, "contatos"),
        count_rows(&conn, "dados_hospitais"),
        count_rows(&conn, "produtos_hospitais"),
    );

    let second = service.run_import().await.unwrap();
    assert!(second.already_imported);
    assert_eq!(second.hospitals.created, 0);
    assert_eq!(second.products.created, 0);

    let after = (
        count_rows(&conn, "hospitais"),
        count_rows(&conn, "contatos"),
        count_rows(&conn, "dados_hospitais"),
        count_rows(&conn, "produtos_hospitais"),
    );
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_existing_hospitals_are_not_duplicated() {
    let (_db, conn) = create_test_db().unwrap();
    let data = sample_data_dir();
    let hospitals = HospitalRepository::new(conn.clone());
    let existing = hospitals
        .create(&nutri_hospital::domain::NewHospital::named("HOSPITAL SAO LUCAS"))
        .unwrap();

    let summary = importer(&conn, &data).run_import().await.unwrap();
    assert_eq!(summary.hospitals.created, 1);
    assert_eq!(summary.hospitals.skipped, 1);
    assert_eq!(count_rows(&conn, "hospitais"), 2);

    // source id 5 now points at the hospital that already existed
    let contacts = ContactRepository::new(conn.clone());
    let linked = contacts.list_by_hospital(existing.id).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].nome_contato, "Ana");
    assert_eq!(linked[0].hospital_nome, "HOSPITAL SAO LUCAS");
}

#[tokio::test]
async fn test_source_ids_survive_rows_without_id() {
    let (_db, conn) = create_test_db().unwrap();
    let data = TempDir::new().unwrap();
    write_sheet(
        data.path(),
        "hospitais",
        &["ID", "NOME"],
        &[&["", "Hospital Sem Id"], &["1", "Hospital Um"]],
    );
    write_sheet(
        data.path(),
        "contatos",
        &["ID_HOSPITAL", "NOME_CONTATO"],
        &[&["1", "Ana"]],
    );

    let summary = importer(&conn, &data).run_import().await.unwrap();
    assert_eq!(summary.hospitals.created, 2);

    let hospitals = HospitalRepository::new(conn.clone());
    assert_eq!(hospitals.find_by_id(1).unwrap().unwrap().nome_hospital, "Hospital Um");
    let contacts = ContactRepository::new(conn.clone()).list_by_hospital(1).unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].hospital_nome, "Hospital Um");
}

#[tokio::test]
async fn test_survey_rows_link_by_id_only() {
    let (_db, conn) = create_test_db().unwrap();
    let data = TempDir::new().unwrap();
    write_sheet(data.path(), "hospitais", &["ID", "NOME"], &[&["5", "Hospital A"]]);
    write_sheet(
        data.path(),
        "dadoshospitais",
        &["ID_HOSPITAL", "NOME_HOSPITAL", "leitos"],
        &[&["999", "hospital a", "80"]],
    );

    let summary = importer(&conn, &data).run_import().await.unwrap();
    assert_eq!(summary.survey.created, 0);
    assert_eq!(summary.survey.skipped, 1);
    assert!(SurveyRepository::new(conn.clone())
        .find_by_hospital(5)
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_missing_sheets_import_nothing_but_complete() {
    let (_db, conn) = create_test_db().unwrap();
    let data = TempDir::new().unwrap();
    write_sheet(data.path(), "hospitais", &["NOME"], &[&["Hospital Unico"]]);

    let summary = importer(&conn, &data).run_import().await.unwrap();
    assert_eq!(summary.hospitals.created, 1);
    assert_eq!(summary.contacts.read, 0);
    assert_eq!(summary.products.read, 0);
    assert!(ImportFlagRepository::new(conn.clone()).is_import_done().unwrap());
}

#[tokio::test]
async fn test_failed_phase_keeps_earlier_phases_and_can_be_retried() {
    logging::init_test();
    let (_db, conn) = create_test_db().unwrap();
    let data = sample_data_dir();
    {
        let guard = conn.lock().unwrap();
        guard
            .execute_batch(
                "CREATE TRIGGER fail_contacts BEFORE INSERT ON contatos \
                 BEGIN SELECT RAISE(ABORT, 'contacts unavailable'); END;",
            )
            .unwrap();
    }

    let service = importer(&conn, &data);
    let err = service.run_import().await.unwrap_err();
    match err {
        ImportError::PhaseFailed { phase, .. } => assert_eq!(phase, ImportPhase::Contacts),
        other => panic!("expected PhaseFailed, got {other:?}"),
    }
    assert_eq!(count_rows(&conn, "hospitais"), 2);
    assert_eq!(count_rows(&conn, "contatos"), 0);
    assert_eq!(count_rows(&conn, "produtos_hospitais"), 0);
    assert!(!service.is_import_done().await.unwrap());

    {
        let guard = conn.lock().unwrap();
        guard.execute_batch("DROP TRIGGER fail_contacts;").unwrap();
    }

    let retry = service.run_import().await.unwrap();
    assert_eq!(retry.hospitals.created, 0);
    assert_eq!(retry.hospitals.skipped, 2);
    assert_eq!(retry.contacts.created, 3);
    assert_eq!(count_rows(&conn, "hospitais"), 2);
    assert_eq!(ContactRepository::new(conn.clone()).list_by_hospital(5).unwrap().len(), 1);
    assert!(service.is_import_done().await.unwrap());
}

#[tokio::test]
async fn test_reset_allows_a_fresh_import() {
    let (_db, conn) = create_test_db().unwrap();
    let data = sample_data_dir();
    let service = importer(&conn, &data);

    service.run_import().await.unwrap();
    let counts = service.reset().await.unwrap();
    assert_eq!(counts.hospitals, 2);
    assert_eq!(counts.contacts, 3);
    assert_eq!(counts.survey, 1);
    assert_eq!(counts.products, 3);
    for table in ["hospitais", "contatos", "dados_hospitais", "produtos_hospitais", "app_meta"] {
        assert_eq!(count_rows(&conn, table), 0, "{table} not empty");
    }
    assert!(!service.is_import_done().await.unwrap());

    let again = service.run_import().await.unwrap();
    assert!(!again.already_imported);
    assert_eq!(again.hospitals.created, 2);
    assert!(HospitalRepository::new(conn.clone()).find_by_id(5).unwrap().is_some());
}

#[tokio::test]
async fn test_repeated_product_rows_are_summed() {
    let (_db, conn) = create_test_db().unwrap();
    let data = TempDir::new().unwrap();
    write_sheet(data.path(), "hospitais", &["ID", "NOME"], &[&["1", "Hospital A"]]);
    write_sheet(
        data.path(),
        "produtoshospitais",
        &["ID_HOSPITAL", "MARCA", "PRODUTO", "QTD"],
        &[
            &["1", "PRODIET", "Formula X", "2"],
            &["1", "prodiet", "formula x", "3,0"],
            &["1", "DANONE", "Formula X", "1"],
        ],
    );

    let summary = importer(&conn, &data).run_import().await.unwrap();
    assert_eq!(summary.products.created, 2);
    assert_eq!(summary.products.updated, 1);

    let products = ProductRepository::new(conn.clone()).list_by_hospital(1).unwrap();
    let prodiet = products
        .iter()
        .find(|p| p.marca_planilha == "PRODIET")
        .unwrap();
    assert_eq!(prodiet.quantidade, 5);
}
