use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

use procdir_core::fs::MemoryFileSystem;
use procdir_core::model::{Area, Service};
use procdir_core::placement::naming::expense_file_name;
use procdir_core::validator::Consistency;
use procdir_core::{
    AppConfig, Error, PlacementOutcome, PlacementPolicy, ProcessArchive, ProcessFilter,
    ProcessRequest, Transfer, UploadFile,
};

fn request(client: &str, service: &str, number: &str, year: &str, reference: &str) -> ProcessRequest {
    ProcessRequest::parse(client, "IMPORTAÇÃO", service, number, year, reference).unwrap()
}

fn count_dirs_named(dir: &Path, name: &str) -> usize {
    let mut count = 0;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if entry.file_name() == name {
                    count += 1;
                }
                count += count_dirs_named(&path, name);
            }
        }
    }
    count
}

#[test]
fn test_new_process_then_reuse() {
    let tmp = tempdir().unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));

    let req = request("acme", "Aéreo", "000123", "24", "PO.99");
    assert_eq!(archive.check(&req).unwrap(), Consistency::New);

    let created = archive.validate_and_materialize(&req).unwrap();
    assert_eq!(
        created,
        tmp.path()
            .join("IMPORTAÇÃO")
            .join("ACME")
            .join("2024")
            .join("IA-000123-24 - PO.99")
    );
    assert!(created.is_dir());

    // Same process again, reference in another case: no second folder.
    let again = request("ACME", "aereo", "000123", "24", "po.99");
    assert!(matches!(archive.check(&again).unwrap(), Consistency::Existing(_)));
    assert_eq!(archive.validate_and_materialize(&again).unwrap(), created);
    assert_eq!(count_dirs_named(tmp.path(), "IA-000123-24 - PO.99"), 1);
}

#[test]
fn test_existing_flat_folder_is_reused() {
    let tmp = tempdir().unwrap();
    let flat = tmp.path().join("IMPORTAÇÃO/ACME/IM-000777-23 - BL 5");
    fs::create_dir_all(&flat).unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));

    let req = request("ACME", "Marítimo", "000777", "23", "BL 5");
    assert_eq!(archive.validate_and_materialize(&req).unwrap(), flat);
    assert!(!tmp.path().join("IMPORTAÇÃO/ACME/2023").exists());
}

#[test]
fn test_service_conflict_creates_nothing() {
    let tmp = tempdir().unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));
    archive
        .validate_and_materialize(&request("ACME", "Aéreo", "000123", "24", "PO.99"))
        .unwrap();

    let conflicting = request("ACME", "Marítimo", "000123", "24", "PO.99");
    match archive.validate_and_materialize(&conflicting) {
        Err(err @ Error::ServiceConflict { .. }) => {
            if let Error::ServiceConflict {
                existing,
                requested,
                ..
            } = &err
            {
                assert_eq!(*existing, Service::Air);
                assert_eq!(*requested, Service::Sea);
            }
            assert!(err.to_string().contains("Aéreo"));
        }
        other => panic!("expected ServiceConflict, got {:?}", other),
    }
    assert!(!tmp
        .path()
        .join("IMPORTAÇÃO/ACME/2024/IM-000123-24 - PO.99")
        .exists());
}

#[test]
fn test_year_conflict_wins_over_other_mismatches() {
    let tmp = tempdir().unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));
    archive
        .validate_and_materialize(&request("ACME", "Aéreo", "000123", "24", "PO.99"))
        .unwrap();

    let bad = request("ACME", "Rodoviário", "000123", "25", "OTHER");
    assert!(matches!(
        archive.validate_and_materialize(&bad),
        Err(Error::YearConflict { existing, requested, .. }) if existing == "24" && requested == "25"
    ));

    let bad_ref = request("ACME", "Aéreo", "000123", "24", "OTHER");
    assert!(matches!(
        archive.validate_and_materialize(&bad_ref),
        Err(Error::ReferenceConflict { .. })
    ));
}

#[test]
fn test_same_number_other_area_or_client_is_new() {
    let tmp = tempdir().unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));
    archive
        .validate_and_materialize(&request("ACME", "Aéreo", "000123", "24", "PO.99"))
        .unwrap();

    let export =
        ProcessRequest::parse("ACME", "EXPORTAÇÃO", "Marítimo", "000123", "23", "X").unwrap();
    assert_eq!(archive.check(&export).unwrap(), Consistency::New);

    let other_client = request("GLOBEX", "Rodoviário", "000123", "22", "Y");
    assert_eq!(archive.check(&other_client).unwrap(), Consistency::New);
}

#[test]
fn test_place_files_into_materialized_folder() {
    let tmp = tempdir().unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));
    let dest = archive
        .validate_and_materialize(&request("ACME", "Aéreo", "000123", "24", "PO.99"))
        .unwrap();

    let outside = tmp.path().join("outside");
    fs::create_dir_all(&outside).unwrap();
    fs::write(outside.join("invoice.pdf"), "v1").unwrap();
    fs::write(outside.join("macro.bat"), "echo").unwrap();

    let files = vec![
        UploadFile::copy_of(outside.join("invoice.pdf")),
        UploadFile::copy_of(outside.join("macro.bat")),
    ];
    let report = archive.place_files(&dest, &files, PlacementPolicy::Substitute);
    assert_eq!(report.len(), 2);
    assert_eq!(report.stored_count(), 1);
    assert_eq!(report.rejected_count(), 1);
    assert!(dest.join("invoice.pdf").exists());
    assert!(!dest.join("macro.bat").exists());

    fs::write(outside.join("invoice.pdf"), "v2").unwrap();
    let report = archive.place_files(
        &dest,
        &[UploadFile::copy_of(outside.join("invoice.pdf"))],
        PlacementPolicy::Skip,
    );
    assert!(matches!(report.entries[0].result, Ok(PlacementOutcome::Skipped(_))));
    assert_eq!(fs::read_to_string(dest.join("invoice.pdf")).unwrap(), "v1");
}

#[test]
fn test_concurrent_batches_into_one_folder() {
    let tmp = tempdir().unwrap();
    let archive = Arc::new(ProcessArchive::new(&AppConfig::with_base_dir(tmp.path())));
    let dest = archive
        .validate_and_materialize(&request("ACME", "Aéreo", "000123", "24", "PO.99"))
        .unwrap();
    let staging = tmp.path().join("staging");
    fs::create_dir_all(&staging).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let archive = Arc::clone(&archive);
            let dest = dest.clone();
            let source = staging.join(format!("upload_{}.tmp", i));
            fs::write(&source, format!("batch {}", i)).unwrap();
            thread::spawn(move || {
                let file = UploadFile::new(source, format!("doc_{}.pdf", i), Transfer::Move);
                archive.place_files(&dest, &[file], PlacementPolicy::Substitute)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().stored_count(), 1);
    }
    assert_eq!(fs::read_dir(&dest).unwrap().count(), 4);
    assert_eq!(fs::read_dir(&staging).unwrap().count(), 0);
}

#[test]
fn test_query_and_lookup() {
    let tmp = tempdir().unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));
    for (client, service, number, reference) in [
        ("ACME", "Marítimo", "000300", "BL 1"),
        ("ACME", "Aéreo", "000100", "PO.99"),
        ("GLOBEX", "Aéreo", "000100", "PO.77"),
    ] {
        archive
            .validate_and_materialize(&request(client, service, number, "24", reference))
            .unwrap();
    }
    archive
        .validate_and_materialize(
            &ProcessRequest::parse("ACME", "EXPORTAÇÃO", "Rodoviário", "000200", "24", "INV-5")
                .unwrap(),
        )
        .unwrap();

    let all = archive.query_processes(&ProcessFilter::default()).unwrap();
    let numbers: Vec<&str> = all.iter().map(|r| r.number.as_str()).collect();
    assert_eq!(numbers, vec!["000100", "000100", "000200", "000300"]);

    let imports = archive
        .query_processes(&ProcessFilter {
            area: Some(Area::Import),
            service: Some(Service::Air),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(imports.len(), 2);

    let found = archive.find_by_number("000100").unwrap();
    assert_eq!(found.len(), 2);
    assert!(archive.find_by_number("999999").unwrap().is_empty());
    assert!(matches!(
        archive.find_by_number("12a"),
        Err(Error::InvalidNumberFormat(_))
    ));
}

#[test]
fn test_expense_folder_and_file_name() {
    let tmp = tempdir().unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir(tmp.path()));
    let dest = archive
        .validate_and_materialize(&request("ACME", "Aéreo", "000123", "24", "PO.99"))
        .unwrap();

    let expenses = archive.expense_folder(&dest).unwrap();
    assert_eq!(expenses, dest.join("DESPESAS"));
    assert!(expenses.is_dir());
    assert_eq!(archive.expense_folder(&dest).unwrap(), expenses);

    // Expense folders are not processes.
    assert_eq!(archive.scan_registry().unwrap().len(), 1);

    let record = archive.find_by_number("000123").unwrap().remove(0);
    assert_eq!(
        expense_file_name(&record, "Frete", "2024-05-31", "boleto.PDF"),
        "ACME - ER000123 - Frete - PO.99 - 31-05-2024.PDF"
    );

    assert!(matches!(
        archive.expense_folder(&tmp.path().join("nope")),
        Err(Error::FolderNotFound(_))
    ));
}

#[test]
fn test_archive_over_memory_file_system() {
    let memory = Arc::new(MemoryFileSystem::new());
    memory.add_dir("/arq/IMPORTAÇÃO").unwrap();
    memory.add_file("/staging/a.pdf", "a").unwrap();
    let archive = ProcessArchive::new(&AppConfig::with_base_dir("/arq"))
        .with_file_system(memory.clone());

    let dest = archive
        .validate_and_materialize(&request("ACME", "Aéreo", "000001", "24", "X"))
        .unwrap();
    assert_eq!(
        dest,
        Path::new("/arq/IMPORTAÇÃO/ACME/2024/IA-000001-24 - X")
    );

    let report = archive.place_files(
        &dest,
        &[UploadFile::new("/staging/a.pdf", "a.pdf", Transfer::Move)],
        PlacementPolicy::Substitute,
    );
    assert_eq!(report.stored_count(), 1);
    assert_eq!(memory.file_names(&dest), vec!["a.pdf"]);
    assert!(memory.file_names("/staging").is_empty());
}
