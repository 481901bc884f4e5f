use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    core::sku::{BatchId, validate_token},
    error::BatchError,
};

/// Default number of items per batch.
pub const DEFAULT_BATCH_SIZE: u32 = 50;

/// Default warehouse location code.
pub const DEFAULT_LOCATION: &str = "DEN001";

/// Persisted counter state of the batch lifecycle.
///
/// Settled states satisfy `1 <= current_item_number <= batch_size`; the
/// value `batch_size + 1` only exists transiently while a batch rolls over
/// and is normalised on load if it ever reaches disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchState {
    pub current_batch_number: u32,
    pub current_item_number: u32,
    pub batch_size: u32,
    pub location: String,
    #[serde(default)]
    pub last_sku: Option<String>,
}

impl Default for BatchState {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_LOCATION)
    }
}

impl BatchState {
    /// A fresh state at batch 1, item 1.
    pub fn new(batch_size: u32, location: &str) -> Self {
        Self {
            current_batch_number: 1,
            current_item_number: 1,
            batch_size,
            location: location.to_string(),
            last_sku: None,
        }
    }

    /// Checks the invariants of a loaded state, including a location that
    /// can be embedded in a SKU.
    ///
    /// Returns `Ok(true)` if the state sits on a batch boundary that still
    /// has to be rolled over.
    fn check(&self) -> Result<bool, BatchError> {
        if self.batch_size == 0 {
            return Err(BatchError::InvalidState("batch size must be at least 1".into()));
        }
        if self.current_batch_number == 0 {
            return Err(BatchError::InvalidState("batch number must be at least 1".into()));
        }
        if self.current_item_number == 0 || self.current_item_number > self.batch_size.saturating_add(1) {
            return Err(BatchError::InvalidState(format!(
                "item number {} outside 1..={}",
                self.current_item_number,
                self.batch_size.saturating_add(1)
            )));
        }
        validate_token("location", &self.location)
            .map_err(|error| BatchError::InvalidState(error.to_string()))?;
        Ok(self.current_item_number > self.batch_size)
    }

    fn next_batch_number(&self) -> Result<u32, BatchError> {
        self.current_batch_number
            .checked_add(1)
            .ok_or_else(|| BatchError::InvalidState("batch number overflow".into()))
    }
}

/// Durable home of the [`BatchState`].
pub trait StateRepository {
    /// Loads the persisted state, `Ok(None)` if none was ever saved.
    fn load(&self) -> Result<Option<BatchState>, BatchError>;

    /// Persists the full state. Must not report success unless the state is durable.
    fn save(&self, state: &BatchState) -> Result<(), BatchError>;
}

/// Owner of the batch lifecycle state machine.
///
/// Every mutation computes the next state, persists it through the
/// repository and only then replaces the in-memory copy. A failed save
/// therefore leaves the manager on the last persisted state.
///
/// # Examples
///
/// ```
/// use sku_batch_rs::core::batch::{BatchManager, BatchState};
/// use sku_batch_rs::store::state::InMemoryStateStore;
///
/// let mut manager = BatchManager::load(InMemoryStateStore::default(), BatchState::new(2, "DEN001")).unwrap();
/// assert_eq!(manager.increment_item().unwrap(), None);
/// assert_eq!(manager.increment_item().unwrap(), Some(1));
/// assert_eq!(manager.current_batch_id().to_string(), "B002-001");
/// ```
pub struct BatchManager<S: StateRepository> {
    repository: S,
    state: BatchState,
}

impl<S: StateRepository> BatchManager<S> {
    /// Loads the state from `repository`.
    ///
    /// When nothing is persisted yet, `initial` is written and used. A state
    /// left on a batch boundary is rolled to the next batch and persisted.
    pub fn load(repository: S, initial: BatchState) -> Result<Self, BatchError> {
        let state = match repository.load()? {
            Some(state) => {
                if state.check()? {
                    warn!(
                        "Batch {} was left full, rolling over to the next batch",
                        state.current_batch_number
                    );
                    let rolled = BatchState {
                        current_batch_number: state.next_batch_number()?,
                        current_item_number: 1,
                        ..state
                    };
                    repository.save(&rolled)?;
                    rolled
                } else {
                    state
                }
            }
            None => {
                initial.check()?;
                info!(
                    "No batch state found, starting at batch 1 (batch size {})",
                    initial.batch_size
                );
                repository.save(&initial)?;
                initial
            }
        };

        Ok(Self { repository, state })
    }

    pub fn state(&self) -> &BatchState {
        &self.state
    }

    pub fn repository(&self) -> &S {
        &self.repository
    }

    pub fn location(&self) -> &str {
        &self.state.location
    }

    /// Display id of the next item to be added, e.g. `B001-004`.
    pub fn current_batch_id(&self) -> BatchId {
        BatchId::new(
            self.state.current_batch_number,
            self.state.current_item_number,
        )
    }

    /// Counts one more item in the current batch.
    ///
    /// Returns the number of the batch that just filled up, if any; in that
    /// case the manager has already moved to item 1 of the next batch.
    pub fn increment_item(&mut self) -> Result<Option<u32>, BatchError> {
        let (next, completed) = self.advanced()?;
        self.commit(next)?;
        self.log_completion(completed);
        Ok(completed)
    }

    /// Records `sku` as the last generated SKU and counts the item, in a
    /// single persisted step.
    pub fn commit_item(&mut self, sku: &str) -> Result<Option<u32>, BatchError> {
        let (mut next, completed) = self.advanced()?;
        next.last_sku = Some(sku.to_string());
        self.commit(next)?;
        self.log_completion(completed);
        Ok(completed)
    }

    /// Closes the current batch early, whatever its fill level.
    ///
    /// No completion is signalled: export the batch before calling this.
    pub fn force_next_batch(&mut self) -> Result<(), BatchError> {
        let next = BatchState {
            current_batch_number: self.state.next_batch_number()?,
            current_item_number: 1,
            ..self.state.clone()
        };
        self.commit(next)?;
        info!("Moved to batch {}", self.state.current_batch_number);
        Ok(())
    }

    /// Back to batch 1, item 1, without a last SKU. Location and batch size are kept.
    pub fn reset(&mut self) -> Result<(), BatchError> {
        let next = BatchState {
            current_batch_number: 1,
            current_item_number: 1,
            last_sku: None,
            ..self.state.clone()
        };
        self.commit(next)?;
        info!("Batch counters reset");
        Ok(())
    }

    pub fn set_location(&mut self, location: &str) -> Result<(), BatchError> {
        validate_token("location", location)?;
        let next = BatchState {
            location: location.to_string(),
            ..self.state.clone()
        };
        self.commit(next)
    }

    pub fn set_last_sku(&mut self, sku: &str) -> Result<(), BatchError> {
        let next = BatchState {
            last_sku: Some(sku.to_string()),
            ..self.state.clone()
        };
        self.commit(next)
    }

    /// Next state after counting one item, crossing the batch boundary in
    /// the same step so `batch_size + 1` is never observable.
    fn advanced(&self) -> Result<(BatchState, Option<u32>), BatchError> {
        let mut next = self.state.clone();
        if next.current_item_number >= next.batch_size {
            let completed = next.current_batch_number;
            next.current_batch_number = next.next_batch_number()?;
            next.current_item_number = 1;
            Ok((next, Some(completed)))
        } else {
            next.current_item_number += 1;
            Ok((next, None))
        }
    }

    fn log_completion(&self, completed: Option<u32>) {
        if let Some(batch_number) = completed {
            info!(
                "Batch {} complete, next batch is {}",
                batch_number, self.state.current_batch_number
            );
        }
    }

    fn commit(&mut self, next: BatchState) -> Result<(), BatchError> {
        self.repository.save(&next)?;
        debug!(
            "Batch state saved: batch {}, item {}",
            next.current_batch_number, next.current_item_number
        );
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::state::InMemoryStateStore;

    fn fresh() -> BatchManager<InMemoryStateStore> {
        BatchManager::load(InMemoryStateStore::default(), BatchState::default()).unwrap()
    }

    #[test]
    fn first_load_persists_the_initial_state() -> Result<(), BatchError> {
        let manager = fresh();
        assert_eq!(manager.repository().load()?, Some(BatchState::default()));
        assert_eq!(manager.current_batch_id().to_string(), "B001-001");
        Ok(())
    }

    #[test]
    fn batch_completes_on_the_fiftieth_increment() -> Result<(), BatchError> {
        let mut manager = fresh();

        for _ in 0..49 {
            assert_eq!(manager.increment_item()?, None);
        }
        assert_eq!(manager.state().current_item_number, 50);
        assert_eq!(manager.increment_item()?, Some(1));

        assert_eq!(manager.state().current_batch_number, 2);
        assert_eq!(manager.state().current_item_number, 1);
        Ok(())
    }

    #[test]
    fn force_next_batch_always_moves_by_one() -> Result<(), BatchError> {
        let mut manager = fresh();
        manager.force_next_batch()?;
        assert_eq!(manager.state().current_batch_number, 2);
        assert_eq!(manager.state().current_item_number, 1);

        manager.increment_item()?;
        manager.increment_item()?;
        manager.force_next_batch()?;
        assert_eq!(manager.state().current_batch_number, 3);
        assert_eq!(manager.state().current_item_number, 1);
        Ok(())
    }

    #[test]
    fn reset_keeps_location_and_batch_size() -> Result<(), BatchError> {
        let mut manager =
            BatchManager::load(InMemoryStateStore::default(), BatchState::new(10, "PHX2"))?;
        manager.commit_item("LN-PHX2-B001-001")?;
        manager.force_next_batch()?;

        manager.reset()?;

        assert_eq!(manager.state(), &BatchState::new(10, "PHX2"));
        assert_eq!(manager.repository().load()?, Some(BatchState::new(10, "PHX2")));
        Ok(())
    }

    #[test]
    fn commit_item_records_the_sku() -> Result<(), BatchError> {
        let mut manager = fresh();
        assert_eq!(manager.commit_item("LN-DEN001-B001-001")?, None);
        let saved = manager.repository().load()?.unwrap();
        assert_eq!(saved.last_sku.as_deref(), Some("LN-DEN001-B001-001"));
        assert_eq!(saved.current_item_number, 2);
        Ok(())
    }

    #[test]
    fn invalid_location_is_rejected_without_saving() -> Result<(), BatchError> {
        let mut manager = fresh();
        assert!(matches!(
            manager.set_location("DEN 001"),
            Err(BatchError::Validation(_))
        ));
        assert_eq!(manager.location(), DEFAULT_LOCATION);

        manager.set_location("PHX2")?;
        assert_eq!(manager.repository().load()?.unwrap().location, "PHX2");
        Ok(())
    }

    #[test]
    fn full_batch_on_disk_is_rolled_over_on_load() -> Result<(), BatchError> {
        let store = InMemoryStateStore::default();
        store.save(&BatchState {
            current_batch_number: 4,
            current_item_number: 51,
            ..BatchState::default()
        })?;

        let manager = BatchManager::load(store, BatchState::default())?;

        assert_eq!(manager.current_batch_id(), BatchId::new(5, 1));
        assert_eq!(manager.repository().load()?.unwrap().current_batch_number, 5);
        Ok(())
    }

    #[test]
    fn unusable_location_is_refused_on_load() -> Result<(), BatchError> {
        let store = InMemoryStateStore::default();
        store.save(&BatchState::new(50, "DEN 001"))?;

        let result = BatchManager::load(store, BatchState::default());
        assert!(matches!(result, Err(BatchError::InvalidState(_))));

        let result = BatchManager::load(InMemoryStateStore::default(), BatchState::new(50, ""));
        assert!(matches!(result, Err(BatchError::InvalidState(_))));
        Ok(())
    }

    #[test]
    fn out_of_range_state_is_refused() -> Result<(), BatchError> {
        let store = InMemoryStateStore::default();
        store.save(&BatchState {
            current_item_number: 0,
            ..BatchState::default()
        })?;

        let result = BatchManager::load(store, BatchState::default());
        assert!(matches!(result, Err(BatchError::InvalidState(_))));
        Ok(())
    }
}
