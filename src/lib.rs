#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # SKU Batch for Rust

 Tracks physical inventory for a resale operation: every item taken in gets
 a condition grade, a SKU and a place in a fixed-size batch. Full batches
 are exported as standalone CSV extracts for the listing tools downstream.

 ## Core Concepts

- **Grade:** condition code of an item, one of `LN` (Like New), `VG` (Very Good),
  `G` (Good), `AC` (Acceptable) or `SA` (Salvage).
- **Batch:** a sequential group of items sharing a batch number, 50 by default.
  Items are identified inside their batch by a batch id such as `B001-004`.
- **SKU:** `{GRADE}-{LOCATION}-{BATCH ID}` with an optional warehouse tag,
  e.g. `LN-DEN001-B001-004-A12`.
- **BatchManager:** the batch counter state machine. Every mutation is
  persisted before it becomes visible.
- **InventoryStore:** append-only CSV file of product records.
- **BatchExporter:** writes the records of one batch to `batches/batch_NNN.csv`.
- **Intake:** ties the above together for the add-product flow.

 ## Modules

| **Module**  | **Description**                                                  |
|-------------|------------------------------------------------------------------|
| core        | Grades, SKUs, product records, batch state machine, intake flow  |
| item        | CSV `ItemReader` and `ItemWriter` for the inventory layout       |
| store       | JSON batch state store and CSV inventory store                   |
| export      | Per-batch extracts                                               |
| config      | Data directory layout and defaults for a fresh state             |

 ## Features

| **Feature** | **Description**                                           |
|-------------|-----------------------------------------------------------|
| cli         | Builds the `sku-batch` command line tool                  |

 ## Getting Started

```rust
# use sku_batch_rs::{
#     config::InventoryConfigBuilder,
#     core::{grade::Grade, intake::Intake, product::NewProduct},
#     error::BatchError,
#     export::ExportOutcome,
# };
fn main() -> Result<(), BatchError> {
    let dir = tempfile::tempdir()?;

    let config = InventoryConfigBuilder::new()
        .data_dir(dir.path())
        .batch_size(2)
        .location("DEN001")
        .build()?;

    let mut intake = Intake::open(&config)?;

    let first = intake.add_product(Grade::LikeNew, NewProduct::default())?;
    assert_eq!(first.record.sku, "LN-DEN001-B001-001");

    let second = intake.add_product(
        Grade::Good,
        NewProduct {
            warehouse_tag: Some("A12".to_string()),
            manufacturer: Some("Sony".to_string()),
            ..NewProduct::default()
        },
    )?;
    assert_eq!(second.record.sku, "G-DEN001-B001-002-A12");

    // the second item filled batch 1, which was exported right away
    assert_eq!(second.completed_batch, Some(1));
    assert!(matches!(second.export, Some(Ok(ExportOutcome::Written { count: 2, .. }))));
    assert!(config.exports_dir().join("batch_001.csv").exists());

    Ok(())
}
```
 */

/// Configuration of the data directory
pub mod config;

/// Core module for inventory and batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Per-batch extracts
pub mod export;

/// Set of items readers / writers (CSV inventory layout)
pub mod item;

/// Durable stores for the batch state and the inventory
pub mod store;
