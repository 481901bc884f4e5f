//! # Batch export
//!
//! Writes the records of one batch to a standalone extract, e.g.
//! `batches/batch_001.csv`, for the listing tools downstream. The extract
//! uses the inventory column layout with a header row, and rows keep their
//! inventory order.
//!
//! Exports are idempotent: the extract is rebuilt from the inventory every
//! time and replaces the previous file, so exporting an unchanged batch
//! twice produces identical bytes. A batch with no records is not an
//! error: [`ExportOutcome::Empty`] is returned and no extract is left for
//! it, so one written before all its records were deleted is removed.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{
    core::{item::ItemWriter, sku::BatchId},
    error::BatchError,
    item::csv::csv_writer::CsvItemWriterBuilder,
    store::{inventory::InventoryStore, state::temp_file_beside},
};

/// What an export did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The extract was written with `count` records.
    Written { path: PathBuf, count: usize },
    /// No record belongs to the batch; no extract exists for it.
    Empty,
}

/// Builds per-batch extracts from an [`InventoryStore`].
///
/// # Examples
///
/// ```
/// use sku_batch_rs::export::{BatchExporterBuilder, ExportOutcome};
/// use sku_batch_rs::store::inventory::InventoryStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let exporter = BatchExporterBuilder::new()
///     .store(InventoryStore::new(dir.path().join("inventory.csv")))
///     .target_dir(dir.path().join("batches"))
///     .build()
///     .unwrap();
///
/// assert_eq!(exporter.export_batch(1).unwrap(), ExportOutcome::Empty);
/// assert_eq!(exporter.extract_path(7), dir.path().join("batches").join("batch_007.csv"));
/// ```
#[derive(Debug, Clone)]
pub struct BatchExporter {
    store: InventoryStore,
    target_dir: PathBuf,
}

impl BatchExporter {
    pub fn new<P: AsRef<Path>>(store: InventoryStore, target_dir: P) -> Self {
        Self {
            store,
            target_dir: target_dir.as_ref().to_path_buf(),
        }
    }

    /// Deterministic extract file for `batch_number`.
    pub fn extract_path(&self, batch_number: u32) -> PathBuf {
        self.target_dir
            .join(format!("batch_{:03}.csv", batch_number))
    }

    /// Exports every record of `batch_number`.
    pub fn export_batch(&self, batch_number: u32) -> Result<ExportOutcome, BatchError> {
        let records = self.store.records_in_batch(batch_number)?;

        if records.is_empty() {
            warn!(
                "No records with batch prefix {}, nothing to export",
                BatchId::batch_prefix(batch_number)
            );
            let stale = self.extract_path(batch_number);
            if stale.exists() {
                fs::remove_file(&stale)?;
                info!("Removed stale extract {}", stale.display());
            }
            return Ok(ExportOutcome::Empty);
        }

        let path = self.extract_path(batch_number);
        let temp = temp_file_beside(&path)?;
        let writer = CsvItemWriterBuilder::new()
            .has_headers(true)
            .from_writer(temp);
        writer.write(&records)?;
        let temp = writer.into_inner()?;
        temp.as_file().sync_all()?;
        temp.persist(&path)
            .map_err(|error| BatchError::Io(error.error))?;

        info!(
            "Batch {} exported: {} record(s) to {}",
            batch_number,
            records.len(),
            path.display()
        );

        Ok(ExportOutcome::Written {
            path,
            count: records.len(),
        })
    }
}

/// Builder for [`BatchExporter`].
#[derive(Default)]
pub struct BatchExporterBuilder {
    store: Option<InventoryStore>,
    target_dir: Option<PathBuf>,
}

impl BatchExporterBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            target_dir: None,
        }
    }

    pub fn store(mut self, store: InventoryStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn target_dir<P: AsRef<Path>>(mut self, target_dir: P) -> Self {
        self.target_dir = Some(target_dir.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<BatchExporter, BatchError> {
        let store = self
            .store
            .ok_or_else(|| BatchError::Configuration("inventory store is required".to_string()))?;
        let target_dir = self
            .target_dir
            .ok_or_else(|| BatchError::Configuration("target directory is required".to_string()))?;

        Ok(BatchExporter::new(store, target_dir))
    }
}
