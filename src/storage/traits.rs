//! Storage traits and error types
//!
//! This module defines the trait interface for checkpoint backends and
//! associated error types.

use crate::record::{CandidateId, ItemRecord};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Checkpoint {path} has an unexpected header: {found}")]
    SchemaMismatch { path: PathBuf, found: String },

    #[error("Invalid row {row} in {path}: {message}")]
    InvalidRow {
        path: PathBuf,
        row: u64,
        message: String,
    },

    #[error("Failed to replace checkpoint {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What a call to [`CheckpointStore::save`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    /// Rows in the checkpoint after the call
    pub rows_total: usize,

    /// Rows contributed by this call
    pub rows_added: usize,

    /// Whether the file was (re)written
    pub written: bool,
}

/// Trait for checkpoint backend implementations
///
/// The checkpoint is both the run's output and the resume ledger. `save` is
/// the only operation that mutates it and must never leave it half-written.
pub trait CheckpointStore {
    /// Returns the ids already persisted
    ///
    /// An absent checkpoint means "no prior run" and yields an empty set.
    fn load_known_ids(&self) -> StorageResult<HashSet<CandidateId>>;

    /// Reads every persisted record
    fn load_records(&self) -> StorageResult<Vec<ItemRecord>>;

    /// Persists `records`
    ///
    /// With `merge_with_existing`, prior rows are kept first and new rows are
    /// appended; a new record whose id already exists is skipped. Without it
    /// the checkpoint is replaced. An empty result writes nothing.
    fn save(&self, records: &[ItemRecord], merge_with_existing: bool)
        -> StorageResult<SaveSummary>;

    /// Returns true if a checkpoint already exists
    fn exists(&self) -> bool;
}
