use std::{
    fs::{File, OpenOptions},
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use log::{debug, info};

use crate::{
    core::{
        item::{ItemReader, ItemWriter},
        product::{COLUMN_NAMES, ProductRecord},
    },
    error::BatchError,
    item::csv::{csv_reader::CsvItemReaderBuilder, csv_writer::CsvItemWriterBuilder},
    store::state::temp_file_beside,
};

/// Append-only CSV file of [`ProductRecord`]s.
///
/// Records keep their insertion order. Appends add a row at the end (with a
/// header first if the file is new or empty); deletions rewrite the whole
/// file through a temporary file and a rename. "Nothing matched" is a
/// normal result (`0` or `None`), never an error.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use sku_batch_rs::core::{grade::Grade, product::ProductRecord, sku::BatchId};
/// use sku_batch_rs::store::inventory::InventoryStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = InventoryStore::new(dir.path().join("inventory.csv"));
/// assert_eq!(store.delete_last().unwrap(), None);
///
/// store.append(&ProductRecord {
///     sku: "LN-DEN001-B001-001".to_string(),
///     grade: Grade::LikeNew,
///     location: Some("DEN001".to_string()),
///     batch_id: Some(BatchId::new(1, 1)),
///     warehouse_tag: None,
///     upc: None,
///     manufacturer: None,
///     model: None,
///     notes: None,
///     timestamp: Utc::now(),
///     manifest_id: None,
///     pallet_id: None,
///     unit_id: None,
///     pid_uid: None,
/// }).unwrap();
///
/// assert_eq!(store.last_sku().unwrap().as_deref(), Some("LN-DEN001-B001-001"));
/// assert_eq!(store.delete_by_sku("LN-DEN001-B001-001").unwrap(), 1);
/// assert!(store.records().unwrap().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct InventoryStore {
    path: PathBuf,
}

impl InventoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in file order. A missing file is an empty store.
    pub fn records(&self) -> Result<Vec<ProductRecord>, BatchError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = CsvItemReaderBuilder::new().from_path(&self.path)?;
        let records: Vec<ProductRecord> = reader.read_all()?;
        debug!("{} records read from {}", records.len(), self.path.display());
        Ok(records)
    }

    /// Appends one record at the end of the file.
    ///
    /// Rows are always written in the current column layout. A file whose
    /// header differs from it (older ten-column exports, reordered columns)
    /// is first rewritten in that layout so the new row lines up.
    pub fn append(&self, record: &ProductRecord) -> Result<(), BatchError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        if !self.has_current_layout()? {
            info!("Rewriting {} in the current column layout", self.path.display());
            let records = self.records()?;
            self.rewrite(&records)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;
        let len = file.metadata()?.len();
        let is_empty = len == 0;

        // a hand-edited file may lack the final line break
        if !is_empty {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        let writer = CsvItemWriterBuilder::new()
            .has_headers(is_empty)
            .from_writer(file);
        writer.write(std::slice::from_ref(record))?;
        let file: File = writer.into_inner()?;
        file.sync_all()?;

        debug!("Appended {} to {}", record.sku, self.path.display());
        Ok(())
    }

    /// SKU of the most recently appended record.
    pub fn last_sku(&self) -> Result<Option<String>, BatchError> {
        Ok(self.records()?.pop().map(|record| record.sku))
    }

    /// Every record carrying `sku`, in file order.
    pub fn find_by_sku(&self, sku: &str) -> Result<Vec<ProductRecord>, BatchError> {
        let sku = sku.trim();
        Ok(self
            .records()?
            .into_iter()
            .filter(|record| record.sku == sku)
            .collect())
    }

    /// Records whose batch id belongs to `batch_number`, in file order.
    pub fn records_in_batch(&self, batch_number: u32) -> Result<Vec<ProductRecord>, BatchError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|record| record.batch_number() == Some(batch_number))
            .collect())
    }

    /// Removes every record carrying `sku` and returns how many were removed.
    pub fn delete_by_sku(&self, sku: &str) -> Result<usize, BatchError> {
        let sku = sku.trim();
        let records = self.records()?;
        let before = records.len();
        let kept: Vec<ProductRecord> = records
            .into_iter()
            .filter(|record| record.sku != sku)
            .collect();
        let removed = before - kept.len();

        if removed > 0 {
            self.rewrite(&kept)?;
            info!("Deleted {} record(s) with SKU {}", removed, sku);
        } else {
            debug!("No record with SKU {}", sku);
        }
        Ok(removed)
    }

    /// Removes the most recently appended record and returns its SKU.
    pub fn delete_last(&self) -> Result<Option<String>, BatchError> {
        let mut records = self.records()?;
        let Some(last) = records.pop() else {
            debug!("Inventory is empty, nothing to delete");
            return Ok(None);
        };

        self.rewrite(&records)?;
        info!("Deleted last record {}", last.sku);
        Ok(Some(last.sku))
    }

    /// Whether appended rows line up with the file: it is missing, empty,
    /// headerless or headed by exactly [`COLUMN_NAMES`].
    fn has_current_layout(&self) -> Result<bool, BatchError> {
        if !self.path.exists() {
            return Ok(true);
        }
        let header = CsvItemReaderBuilder::new().sniff_header(File::open(&self.path)?)?;
        Ok(header.is_none_or(|header| header.iter().eq(COLUMN_NAMES)))
    }

    fn rewrite(&self, records: &[ProductRecord]) -> Result<(), BatchError> {
        let temp = temp_file_beside(&self.path)?;
        let writer = CsvItemWriterBuilder::new()
            .has_headers(true)
            .from_writer(temp);
        writer.write(records)?;
        let temp = writer.into_inner()?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path)
            .map_err(|error| BatchError::Io(error.error))?;
        Ok(())
    }
}
