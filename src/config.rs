use std::path::{Path, PathBuf};

use crate::{
    core::{
        batch::{BatchState, DEFAULT_BATCH_SIZE, DEFAULT_LOCATION},
        sku::validate_token,
    },
    error::BatchError,
};

const STATE_FILE: &str = "batch_state.json";
const INVENTORY_FILE: &str = "inventory.csv";
const EXPORTS_DIR: &str = "batches";

/// Where the tool keeps its files and how a fresh batch state looks.
///
/// All files live under one data directory:
///
/// ```text
/// <data_dir>/batch_state.json     batch counters
/// <data_dir>/inventory.csv        product records
/// <data_dir>/batches/batch_NNN.csv  one extract per exported batch
/// ```
///
/// `batch_size` and `location` only seed the state created on first run.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryConfig {
    data_dir: PathBuf,
    batch_size: u32,
    location: String,
}

impl InventoryConfig {
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE)
    }

    pub fn inventory_path(&self) -> PathBuf {
        self.data_dir.join(INVENTORY_FILE)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.data_dir.join(EXPORTS_DIR)
    }

    /// State written when no state file exists yet.
    pub fn initial_state(&self) -> BatchState {
        BatchState::new(self.batch_size, &self.location)
    }
}

/// Builder for [`InventoryConfig`].
///
/// # Examples
///
/// ```
/// use sku_batch_rs::config::InventoryConfigBuilder;
///
/// let config = InventoryConfigBuilder::new()
///     .data_dir("/srv/resale")
///     .batch_size(25)
///     .location("PHX2")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.batch_size(), 25);
/// assert!(config.inventory_path().ends_with("inventory.csv"));
/// assert!(InventoryConfigBuilder::new().batch_size(0).build().is_err());
/// ```
#[derive(Debug, Clone)]
pub struct InventoryConfigBuilder {
    data_dir: PathBuf,
    batch_size: u32,
    location: String,
}

impl Default for InventoryConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryConfigBuilder {
    /// Defaults: `./data`, batches of 50, location `DEN001`.
    pub fn new() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            batch_size: DEFAULT_BATCH_SIZE,
            location: DEFAULT_LOCATION.to_string(),
        }
    }

    pub fn data_dir<P: AsRef<Path>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.as_ref().to_path_buf();
        self
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = location.into();
        self
    }

    pub fn build(self) -> Result<InventoryConfig, BatchError> {
        if self.batch_size == 0 {
            return Err(BatchError::Configuration(
                "batch size must be at least 1".to_string(),
            ));
        }
        validate_token("location", &self.location)
            .map_err(|error| BatchError::Configuration(error.to_string()))?;

        Ok(InventoryConfig {
            data_dir: self.data_dir,
            batch_size: self.batch_size,
            location: self.location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_hang_off_the_data_dir() -> Result<(), BatchError> {
        let config = InventoryConfigBuilder::new().data_dir("/tmp/resale").build()?;

        assert_eq!(config.state_path(), Path::new("/tmp/resale/batch_state.json"));
        assert_eq!(config.inventory_path(), Path::new("/tmp/resale/inventory.csv"));
        assert_eq!(config.exports_dir(), Path::new("/tmp/resale/batches"));
        Ok(())
    }

    #[test]
    fn initial_state_uses_configured_values() -> Result<(), BatchError> {
        let config = InventoryConfigBuilder::new()
            .batch_size(12)
            .location("PHX2")
            .build()?;

        let state = config.initial_state();
        assert_eq!(state.batch_size, 12);
        assert_eq!(state.location, "PHX2");
        assert_eq!(state.current_batch_number, 1);
        Ok(())
    }

    #[test]
    fn bad_location_is_a_configuration_error() {
        let result = InventoryConfigBuilder::new().location("DEN 001").build();
        assert!(matches!(result, Err(BatchError::Configuration(_))));
    }
}
