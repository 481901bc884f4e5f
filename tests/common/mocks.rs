//! Mock versions of std::fs::File and the batch state repository.
use mockall::mock;

use std::io::{self, Write};

use sku_batch_rs::{
    core::batch::{BatchState, StateRepository},
    error::BatchError,
};

mock! {
    pub File {}
    impl Write for File {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize>;
        fn flush(&mut self) -> io::Result<()>;
    }
}

mock! {
    pub StateStore {}
    impl StateRepository for StateStore {
        fn load(&self) -> Result<Option<BatchState>, BatchError>;
        fn save(&self, state: &BatchState) -> Result<(), BatchError>;
    }
}
