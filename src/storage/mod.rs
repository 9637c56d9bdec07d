//! Storage module for persisting harvested records
//!
//! This module handles the CSV checkpoint, which is both the run's output and
//! the resume ledger:
//! - Reading the set of already-fetched ids
//! - Merging new records after prior ones without duplicating ids
//! - Atomic full rewrites so a crash never truncates the file

mod csv_store;
mod traits;

pub use csv_store::CsvCheckpoint;
pub use traits::{CheckpointStore, SaveSummary, StorageError, StorageResult};
