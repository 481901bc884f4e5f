mod common;

use common::{MockFile, MockStateStore};

use std::io::{self, ErrorKind};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use sku_batch_rs::{
    core::{
        batch::{BatchManager, BatchState},
        grade::Grade,
        intake::Intake,
        item::ItemWriter,
        product::{NewProduct, ProductRecord},
        sku::BatchId,
    },
    error::BatchError,
    export::BatchExporter,
    item::csv::csv_writer::CsvItemWriterBuilder,
    store::inventory::InventoryStore,
};

fn disk_full() -> BatchError {
    BatchError::Io(io::Error::from(ErrorKind::StorageFull))
}

/// A store that holds `state` and refuses every save.
fn read_only_store(state: BatchState) -> MockStateStore {
    let mut store = MockStateStore::new();
    store
        .expect_load()
        .returning(move || Ok(Some(state.clone())));
    store.expect_save().returning(|_| Err(disk_full()));
    store
}

fn mid_batch() -> BatchState {
    BatchState {
        current_batch_number: 3,
        current_item_number: 50,
        last_sku: Some("G-DEN001-B003-049".to_string()),
        ..BatchState::default()
    }
}

#[test]
fn failed_save_leaves_the_manager_on_the_persisted_state() -> Result<(), BatchError> {
    let mut manager = BatchManager::load(read_only_store(mid_batch()), BatchState::default())?;

    assert!(matches!(manager.increment_item(), Err(BatchError::Io(_))));
    assert!(matches!(manager.commit_item("LN-DEN001-B003-050"), Err(BatchError::Io(_))));
    assert!(matches!(manager.force_next_batch(), Err(BatchError::Io(_))));
    assert!(matches!(manager.reset(), Err(BatchError::Io(_))));
    assert!(matches!(manager.set_location("PHX2"), Err(BatchError::Io(_))));
    assert!(matches!(manager.set_last_sku("X"), Err(BatchError::Io(_))));

    assert_eq!(manager.state(), &mid_batch());
    assert_eq!(manager.current_batch_id(), BatchId::new(3, 50));
    Ok(())
}

#[test]
fn first_run_fails_when_the_initial_state_cannot_be_saved() {
    let mut store = MockStateStore::new();
    store.expect_load().times(1).returning(|| Ok(None));
    store.expect_save().times(1).returning(|_| Err(disk_full()));

    let result = BatchManager::load(store, BatchState::default());

    assert!(matches!(result, Err(BatchError::Io(_))));
}

#[test]
fn invalid_initial_state_is_never_saved() {
    let mut store = MockStateStore::new();
    store.expect_load().returning(|| Ok(None));
    store.expect_save().never();

    let result = BatchManager::load(store, BatchState::new(0, "DEN001"));
    assert!(matches!(result, Err(BatchError::InvalidState(_))));
}

#[test]
fn failed_commit_removes_the_appended_record() -> Result<(), BatchError> {
    let temp_dir = TempDir::new()?;
    let store = InventoryStore::new(temp_dir.path().join("inventory.csv"));
    let exporter = BatchExporter::new(store.clone(), temp_dir.path().join("batches"));
    let manager = BatchManager::load(read_only_store(mid_batch()), BatchState::default())?;
    let mut intake = Intake::new(manager, store, exporter);

    let result = intake.add_product(Grade::Good, NewProduct::default());

    assert!(matches!(result, Err(BatchError::Io(_))));
    assert!(intake.store().records()?.is_empty());
    assert_eq!(intake.state(), &mid_batch());
    assert!(!intake.exporter().extract_path(3).exists());
    Ok(())
}

#[test]
fn invalid_grade_code_is_rejected_before_anything_happens() {
    let result = "XX".parse::<Grade>();
    assert!(matches!(result, Err(BatchError::InvalidGrade(code)) if code == "XX"));
}

#[test]
fn write_failure_is_reported_as_item_writer_error() {
    let mut file = MockFile::default();
    file.expect_write().returning(|_buf| {
        let err = io::Error::from(ErrorKind::PermissionDenied);
        Result::Err(err)
    });
    file.expect_flush().returning(|| Ok(()));

    let writer = CsvItemWriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    let record = ProductRecord {
        sku: "LN-DEN001-B001-001".to_string(),
        grade: Grade::LikeNew,
        location: Some("DEN001".to_string()),
        batch_id: Some(BatchId::new(1, 1)),
        warehouse_tag: None,
        upc: None,
        manufacturer: None,
        model: None,
        notes: None,
        timestamp: Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap(),
        manifest_id: None,
        pallet_id: None,
        unit_id: None,
        pid_uid: None,
    };

    // rows are buffered, the error surfaces on flush
    let _ = writer.write(&[record]);
    let result = ItemWriter::<ProductRecord>::flush(&writer);

    assert!(matches!(result, Err(BatchError::ItemWriter(_))));
}
