use std::{cell::RefCell, io, result};

use csv::{Writer, WriterBuilder};
use serde::Serialize;

use crate::{
    core::item::{ItemWriter, ItemWriterResult},
    error::BatchError,
};

/// Serializes items as CSV rows with serde.
///
/// When built with `has_headers(true)` the header row is derived from the
/// serde field names and written before the first item. Nothing at all is
/// written if no item ever is.
pub struct CsvItemWriter<T: io::Write> {
    wrapper: RefCell<Writer<T>>,
}

impl<T: io::Write, R: Serialize> ItemWriter<R> for CsvItemWriter<T> {
    fn write(&self, items: &[R]) -> ItemWriterResult {
        let mut wrapper = self.wrapper.borrow_mut();
        for item in items {
            wrapper
                .serialize(item)
                .map_err(|error| BatchError::ItemWriter(error.to_string()))?;
        }
        Ok(())
    }

    /// Flush the contents of the internal buffer to the underlying writer.
    ///
    /// Note that this also flushes the underlying writer.
    fn flush(&self) -> ItemWriterResult {
        self.wrapper
            .borrow_mut()
            .flush()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

impl<T: io::Write> CsvItemWriter<T> {
    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> result::Result<T, BatchError> {
        self.wrapper
            .into_inner()
            .into_inner()
            .map_err(|error| BatchError::ItemWriter(error.to_string()))
    }
}

/// A builder for [`CsvItemWriter`]. Fields are comma separated.
pub struct CsvItemWriterBuilder {
    has_headers: bool,
}

impl Default for CsvItemWriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvItemWriterBuilder {
    pub fn new() -> CsvItemWriterBuilder {
        CsvItemWriterBuilder { has_headers: false }
    }

    pub fn has_headers(mut self, yes: bool) -> CsvItemWriterBuilder {
        self.has_headers = yes;
        self
    }

    /// Wraps any writer, e.g. a file opened in append mode or a `Vec<u8>`.
    ///
    /// ```
    /// # use std::error::Error;
    /// # use sku_batch_rs::{item::csv::csv_writer::CsvItemWriterBuilder, core::item::ItemWriter};
    /// #[derive(serde::Serialize)]
    /// struct Row<'a> {
    ///     #[serde(rename = "SKU")]
    ///     sku: &'a str,
    ///     #[serde(rename = "Notes")]
    ///     notes: Option<&'a str>,
    /// }
    ///
    /// # fn main() { example().unwrap(); }
    /// fn example() -> Result<(), Box<dyn Error>> {
    ///     let wtr = CsvItemWriterBuilder::new()
    ///         .has_headers(true)
    ///         .from_writer(vec![]);
    ///
    ///     wtr.write(&[
    ///         Row { sku: "LN-DEN001-B001-001", notes: None },
    ///         Row { sku: "G-DEN001-B001-002", notes: Some("scuffed, works") },
    ///     ])?;
    ///
    ///     let data = String::from_utf8(wtr.into_inner()?)?;
    ///     assert_eq!(data, "\
    /// SKU,Notes
    /// LN-DEN001-B001-001,
    /// G-DEN001-B001-002,\"scuffed, works\"
    /// ");
    ///     Ok(())
    /// }
    /// ```
    pub fn from_writer<W: io::Write>(self, wtr: W) -> CsvItemWriter<W> {
        let wtr = WriterBuilder::new()
            .flexible(false)
            .has_headers(self.has_headers)
            .from_writer(wtr);

        CsvItemWriter {
            wrapper: RefCell::new(wtr),
        }
    }
}
