use chrono::{SubsecRound, Utc};
use log::{info, warn};

use crate::{
    config::InventoryConfig,
    core::{
        batch::{BatchManager, BatchState, StateRepository},
        grade::Grade,
        product::{NewProduct, ProductRecord, non_blank},
        sku::{BatchId, Sku},
    },
    error::BatchError,
    export::{BatchExporter, BatchExporterBuilder, ExportOutcome},
    store::{inventory::InventoryStore, state::JsonStateStore},
};

/// Result of adding one product.
///
/// Once the record is stored and counted the product is added, whatever
/// happens to the export. A failed export is reported in `export` and the
/// batch can be exported again with [`Intake::export_batch`].
#[derive(Debug)]
pub struct AddOutcome {
    /// The record as written to the inventory.
    pub record: ProductRecord,
    /// Number of the batch this product completed, if any.
    pub completed_batch: Option<u32>,
    /// Export of the completed batch.
    pub export: Option<Result<ExportOutcome, BatchError>>,
}

/// Drives the intake of products: SKU assignment, inventory append, batch
/// counting and export of completed batches.
///
/// Adding a product runs these steps in order:
///
/// 1. the current batch id and location are read from the [`BatchManager`]
/// 2. the SKU is formatted from grade, location, batch id and tag
/// 3. the record is appended to the [`InventoryStore`]
/// 4. the item is committed (last SKU and counter in one persisted step)
/// 5. if the batch filled up, the [`BatchExporter`] writes its extract
///
/// Validation happens before step 3, so a rejected product changes nothing.
///
/// # Examples
///
/// ```
/// use sku_batch_rs::config::InventoryConfigBuilder;
/// use sku_batch_rs::core::{grade::Grade, intake::Intake, product::NewProduct};
///
/// let dir = tempfile::tempdir().unwrap();
/// let config = InventoryConfigBuilder::new().data_dir(dir.path()).build().unwrap();
/// let mut intake = Intake::open(&config).unwrap();
///
/// let outcome = intake.add_product(Grade::LikeNew, NewProduct::default()).unwrap();
/// assert_eq!(outcome.record.sku, "LN-DEN001-B001-001");
/// assert_eq!(outcome.completed_batch, None);
/// assert_eq!(intake.current_batch_id().to_string(), "B001-002");
/// ```
pub struct Intake<S: StateRepository> {
    manager: BatchManager<S>,
    store: InventoryStore,
    exporter: BatchExporter,
}

impl Intake<JsonStateStore> {
    /// Opens the files under the configured data directory.
    pub fn open(config: &InventoryConfig) -> Result<Self, BatchError> {
        let manager = BatchManager::load(
            JsonStateStore::new(config.state_path()),
            config.initial_state(),
        )?;
        let store = InventoryStore::new(config.inventory_path());
        let exporter = BatchExporterBuilder::new()
            .store(store.clone())
            .target_dir(config.exports_dir())
            .build()?;

        Ok(Self::new(manager, store, exporter))
    }
}

impl<S: StateRepository> Intake<S> {
    pub fn new(manager: BatchManager<S>, store: InventoryStore, exporter: BatchExporter) -> Self {
        Self {
            manager,
            store,
            exporter,
        }
    }

    pub fn state(&self) -> &BatchState {
        self.manager.state()
    }

    pub fn manager(&self) -> &BatchManager<S> {
        &self.manager
    }

    pub fn store(&self) -> &InventoryStore {
        &self.store
    }

    pub fn exporter(&self) -> &BatchExporter {
        &self.exporter
    }

    pub fn current_batch_id(&self) -> BatchId {
        self.manager.current_batch_id()
    }

    /// Assigns a SKU to `product`, records it and counts it in the current batch.
    pub fn add_product(
        &mut self,
        grade: Grade,
        product: NewProduct,
    ) -> Result<AddOutcome, BatchError> {
        let batch_id = self.manager.current_batch_id();
        let location = self.manager.location().to_string();
        let warehouse_tag = non_blank(product.warehouse_tag);

        let sku = Sku::new(grade, &location, batch_id, warehouse_tag.as_deref())?.to_string();

        let record = ProductRecord {
            sku,
            grade,
            location: Some(location),
            batch_id: Some(batch_id),
            warehouse_tag,
            upc: non_blank(product.upc),
            manufacturer: non_blank(product.manufacturer),
            model: non_blank(product.model),
            notes: non_blank(product.notes),
            timestamp: Utc::now().trunc_subsecs(0),
            manifest_id: non_blank(product.manifest_id),
            pallet_id: non_blank(product.pallet_id),
            unit_id: non_blank(product.unit_id),
            pid_uid: non_blank(product.pid_uid),
        };

        self.store.append(&record)?;

        let completed_batch = match self.manager.commit_item(&record.sku) {
            Ok(completed) => completed,
            Err(error) => {
                // undo the append
                warn!("Batch state not saved, removing {} again", record.sku);
                self.store.delete_last()?;
                return Err(error);
            }
        };
        info!("Added {} ({})", record.sku, grade.description());

        let export = completed_batch.map(|batch_number| {
            let result = self.exporter.export_batch(batch_number);
            if let Err(error) = &result {
                warn!("Batch {} complete but not exported: {}", batch_number, error);
            }
            result
        });

        Ok(AddOutcome {
            record,
            completed_batch,
            export,
        })
    }

    /// Closes the current batch early: exports it, then moves to the next batch.
    pub fn close_batch(&mut self) -> Result<ExportOutcome, BatchError> {
        let batch_number = self.manager.state().current_batch_number;
        let outcome = self.exporter.export_batch(batch_number)?;
        self.manager.force_next_batch()?;
        Ok(outcome)
    }

    pub fn export_batch(&self, batch_number: u32) -> Result<ExportOutcome, BatchError> {
        self.exporter.export_batch(batch_number)
    }

    pub fn delete_sku(&self, sku: &str) -> Result<usize, BatchError> {
        self.store.delete_by_sku(sku)
    }

    pub fn delete_last(&self) -> Result<Option<String>, BatchError> {
        self.store.delete_last()
    }

    pub fn reset(&mut self) -> Result<(), BatchError> {
        self.manager.reset()
    }

    pub fn set_location(&mut self, location: &str) -> Result<(), BatchError> {
        self.manager.set_location(location)
    }
}
