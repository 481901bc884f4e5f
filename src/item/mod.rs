/// This module provides the CSV item reader and writer used by the inventory store and the batch exporter.
pub mod csv;
