use crate::error::BatchError;

/// Result of reading one item: `Ok(None)` once the source is exhausted.
pub type ItemReaderResult<R> = Result<Option<R>, BatchError>;

/// Result of writing or flushing items.
pub type ItemWriterResult = Result<(), BatchError>;

/// A source of items, read one at a time.
pub trait ItemReader<R> {
    /// Reads the next item.
    ///
    /// # Returns
    /// - `Ok(Some(item))` if an item was read
    /// - `Ok(None)` if there are no more items
    /// - `Err(BatchError)` if the item could not be read or decoded
    fn read(&self) -> ItemReaderResult<R>;

    /// Drains the reader into a vector, stopping at the first error.
    fn read_all(&self) -> Result<Vec<R>, BatchError> {
        let mut items = Vec::new();
        while let Some(item) = self.read()? {
            items.push(item);
        }
        Ok(items)
    }
}

/// A destination for items, written a slice at a time.
pub trait ItemWriter<W> {
    fn write(&self, items: &[W]) -> ItemWriterResult;

    /// Flushes buffered output to the underlying writer.
    fn flush(&self) -> ItemWriterResult;
}
