//! Snapshot access to the learner's persisted data.
//!
//! A `LearnerStore` hands back one complete, internally consistent snapshot
//! per read. Derivations only ever run on a snapshot that was fully fetched.

use crate::state::CardStateTable;
use crate::{CardStateRecord, ProgressSnapshot, Result, ReviewLogEntry};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Everything the engine reads, fetched before any derivation starts
#[derive(Clone, Debug, Default)]
pub struct LearnerSnapshot {
    pub progress: ProgressSnapshot,
    pub card_states: Vec<CardStateRecord>,
    pub reviews: Vec<ReviewLogEntry>,
}

/// Source of learner snapshots
pub trait LearnerStore {
    fn progress(&self) -> Result<ProgressSnapshot>;

    fn card_states(&self) -> Result<Vec<CardStateRecord>>;

    /// Review entries at or after `start`
    fn logs_in_range(&self, start: DateTime<Utc>) -> Result<Vec<ReviewLogEntry>>;

    /// Fetch a full snapshot; any failing read fails the whole snapshot
    fn snapshot(&self, logs_since: DateTime<Utc>) -> Result<LearnerSnapshot> {
        Ok(LearnerSnapshot {
            progress: self.progress()?,
            card_states: self.card_states()?,
            reviews: self.logs_in_range(logs_since)?,
        })
    }
}

/// File-backed store rooted at a data directory
///
/// Layout:
/// - `progress.json`
/// - `cards.json`
/// - `reviews/reviews.jsonl` (live log) and `reviews.csv` (archive)
#[derive(Clone, Debug)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn progress_path(&self) -> PathBuf {
        self.data_dir.join("progress.json")
    }

    pub fn cards_path(&self) -> PathBuf {
        self.data_dir.join("cards.json")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("reviews")
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir().join("reviews.jsonl")
    }

    pub fn archive_path(&self) -> PathBuf {
        self.data_dir.join("reviews.csv")
    }
}

impl LearnerStore for FileStore {
    fn progress(&self) -> Result<ProgressSnapshot> {
        ProgressSnapshot::load(&self.progress_path())
    }

    fn card_states(&self) -> Result<Vec<CardStateRecord>> {
        Ok(CardStateTable::load(&self.cards_path())?.records())
    }

    fn logs_in_range(&self, start: DateTime<Utc>) -> Result<Vec<ReviewLogEntry>> {
        crate::history::load_logs_in_range(&self.log_path(), &self.archive_path(), start)
    }
}
