//! CSV checkpoint implementation
//!
//! The checkpoint is rewritten in full on every save: prior rows are read,
//! new rows appended, and the result is written to a temporary file in the
//! same directory before being renamed over the target.

use crate::record::{CandidateId, ItemRecord, CHECKPOINT_HEADER};
use crate::storage::traits::{CheckpointStore, SaveSummary, StorageError, StorageResult};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// CSV-backed checkpoint at a fixed path
#[derive(Debug, Clone)]
pub struct CsvCheckpoint {
    path: PathBuf,
}

impl CsvCheckpoint {
    /// Creates a checkpoint handle; nothing is touched on disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the prior rows verbatim, checking the header first
    fn read_prior_rows(&self) -> StorageResult<Vec<StringRecord>> {
        let mut reader = ReaderBuilder::new().from_path(&self.path)?;
        self.check_header(reader.headers()?)?;

        let mut rows = Vec::new();
        for row in reader.records() {
            rows.push(row?);
        }
        Ok(rows)
    }

    fn check_header(&self, header: &StringRecord) -> StorageResult<()> {
        if header.iter().eq(CHECKPOINT_HEADER.iter().copied()) {
            return Ok(());
        }

        Err(StorageError::SchemaMismatch {
            path: self.path.clone(),
            found: header.iter().collect::<Vec<_>>().join(","),
        })
    }

    fn parse_id(&self, row: &StringRecord, index: usize) -> StorageResult<CandidateId> {
        let row_number = row.position().map(|p| p.line()).unwrap_or(0);
        let raw = row.get(index).unwrap_or("").trim();

        raw.parse().map_err(|_| StorageError::InvalidRow {
            path: self.path.clone(),
            row: row_number,
            message: format!("appid '{}' is not a positive integer", raw),
        })
    }

    /// Writes the full row set atomically
    fn write_rows(&self, prior: &[StringRecord], new: &[&ItemRecord]) -> StorageResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_writer(tmp.as_file_mut());
            writer.write_record(CHECKPOINT_HEADER)?;
            for row in prior {
                writer.write_record(row)?;
            }
            for record in new {
                writer.serialize(record)?;
            }
            writer.flush()?;
        }
        tmp.as_file_mut().flush()?;
        tmp.as_file().sync_all()?;

        tmp.persist(&self.path).map_err(|e| StorageError::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;

        Ok(())
    }
}

impl CheckpointStore for CsvCheckpoint {
    fn load_known_ids(&self) -> StorageResult<HashSet<CandidateId>> {
        if !self.exists() {
            return Ok(HashSet::new());
        }

        // Same header check as save, so a foreign file fails before any fetching
        let mut reader = ReaderBuilder::new().from_path(&self.path)?;
        self.check_header(reader.headers()?)?;

        let mut ids = HashSet::new();
        for row in reader.records() {
            let row = row?;
            ids.insert(self.parse_id(&row, 0)?);
        }

        tracing::debug!("Loaded {} known ids from {}", ids.len(), self.path.display());
        Ok(ids)
    }

    fn load_records(&self) -> StorageResult<Vec<ItemRecord>> {
        if !self.exists() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().from_path(&self.path)?;
        self.check_header(reader.headers()?)?;

        let mut records = Vec::new();
        for row in reader.deserialize() {
            records.push(row?);
        }
        Ok(records)
    }

    fn save(
        &self,
        records: &[ItemRecord],
        merge_with_existing: bool,
    ) -> StorageResult<SaveSummary> {
        let prior = if merge_with_existing && self.exists() {
            self.read_prior_rows()?
        } else {
            Vec::new()
        };

        let mut seen = HashSet::with_capacity(prior.len() + records.len());
        for row in &prior {
            seen.insert(self.parse_id(row, 0)?);
        }

        let mut new = Vec::with_capacity(records.len());
        for record in records {
            if seen.insert(record.appid) {
                new.push(record);
            } else {
                tracing::warn!("Skipping duplicate appid {} while saving", record.appid);
            }
        }

        let rows_total = prior.len() + new.len();
        if new.is_empty() {
            tracing::debug!(
                "Nothing new to write; leaving {} untouched",
                self.path.display()
            );
            return Ok(SaveSummary {
                rows_total,
                rows_added: 0,
                written: false,
            });
        }

        self.write_rows(&prior, &new)?;
        tracing::debug!(
            "Wrote {} rows ({} new) to {}",
            rows_total,
            new.len(),
            self.path.display()
        );

        Ok(SaveSummary {
            rows_total,
            rows_added: new.len(),
            written: true,
        })
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }
}
