//! CSV support for the inventory layout.
//!
//! # Module Architecture
//!
//! 1. **CsvItemReader**: reads inventory rows into [`ProductRecord`]s. It
//!    sniffs whether the first row is a header, maps headered files by
//!    column name and headerless files by position, pads short rows and
//!    skips blank ones.
//!
//! 2. **CsvItemWriter**: serializes records with serde, optionally writing
//!    the header row first.
//!
//! Both follow the builder pattern and implement the crate's
//! [`ItemReader`](crate::core::item::ItemReader) and
//! [`ItemWriter`](crate::core::item::ItemWriter) traits.
//!
//! # Column layout
//!
//! ```text
//! SKU,Grade,Location,Batch ID,Warehouse Tag,UPC,Manufacturer,Model,Notes,Timestamp,
//! Manifest ID,Pallet ID,Unit ID,PID-UID
//! ```
//!
//! The four manifest columns are optional on read; older ten-column files
//! load unchanged.
//!
//! # Examples
//!
//! ```
//! use sku_batch_rs::core::item::{ItemReader, ItemWriter};
//! use sku_batch_rs::core::product::ProductRecord;
//! use sku_batch_rs::item::csv::csv_reader::CsvItemReaderBuilder;
//! use sku_batch_rs::item::csv::csv_writer::CsvItemWriterBuilder;
//!
//! let legacy = "\
//! SKU,Grade,Location,Batch ID,Warehouse Tag,UPC,Manufacturer,Model,Notes,Timestamp
//! LN-DEN001-B001-001,LN,DEN001,B001-001,,,Sony,,,2024-03-09 14:05:00
//! ";
//!
//! let reader = CsvItemReaderBuilder::new().from_reader(legacy.as_bytes());
//! let records: Vec<ProductRecord> = reader.read_all().unwrap();
//!
//! let mut buffer = Vec::new();
//! {
//!     let writer = CsvItemWriterBuilder::new()
//!         .has_headers(true)
//!         .from_writer(&mut buffer);
//!     writer.write(records.as_slice()).unwrap();
//!     ItemWriter::<ProductRecord>::flush(&writer).unwrap();
//! }
//!
//! let output = String::from_utf8(buffer).unwrap();
//! assert!(output.contains("LN-DEN001-B001-001,LN,DEN001,B001-001,,,Sony,,,2024-03-09T14:05:00Z,,,,"));
//! ```
//!
//! [`ProductRecord`]: crate::core::product::ProductRecord

/// A module providing facilities for reading CSV data records.
pub mod csv_reader;

/// A module providing facilities for writing CSV data records.
pub mod csv_writer;
