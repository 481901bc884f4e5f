use std::{
    cell::RefCell,
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;
use tempfile::NamedTempFile;

use crate::{
    core::batch::{BatchState, StateRepository},
    error::BatchError,
};

/// Batch state kept as a pretty-printed JSON document.
///
/// Saves write a temporary file next to the target and rename it into
/// place, so the previous document survives a failed save.
///
/// # Examples
///
/// ```
/// use sku_batch_rs::core::batch::{BatchState, StateRepository};
/// use sku_batch_rs::store::state::JsonStateStore;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = JsonStateStore::new(dir.path().join("batch_state.json"));
/// assert_eq!(store.load().unwrap(), None);
///
/// store.save(&BatchState::default()).unwrap();
/// assert_eq!(store.load().unwrap(), Some(BatchState::default()));
/// ```
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateRepository for JsonStateStore {
    fn load(&self) -> Result<Option<BatchState>, BatchError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&content)?;
        debug!("Batch state loaded from {}", self.path.display());
        Ok(Some(state))
    }

    fn save(&self, state: &BatchState) -> Result<(), BatchError> {
        let json = serde_json::to_string_pretty(state)?;
        write_atomically(&self.path, json.as_bytes())
    }
}

/// Writes `content` to a sibling temp file, syncs it and renames it over `path`.
pub(crate) fn write_atomically(path: &Path, content: &[u8]) -> Result<(), BatchError> {
    let mut file = temp_file_beside(path)?;
    file.write_all(content)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| BatchError::Io(error.error))?;
    Ok(())
}

/// Creates a temp file in the directory of `path`, creating the directory if needed.
pub(crate) fn temp_file_beside(path: &Path) -> Result<NamedTempFile, BatchError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    Ok(NamedTempFile::new_in(dir)?)
}

/// A non-durable repository, for dry runs and tests.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    state: RefCell<Option<BatchState>>,
}

impl StateRepository for InMemoryStateStore {
    fn load(&self) -> Result<Option<BatchState>, BatchError> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &BatchState) -> Result<(), BatchError> {
        *self.state.borrow_mut() = Some(state.clone());
        Ok(())
    }
}
