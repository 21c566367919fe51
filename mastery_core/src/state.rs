//! Persisted learner state with file locking.
//!
//! Two JSON documents live in the data directory:
//! - `progress.json`: latest `LessonProgress` per lesson
//! - `cards.json`: latest scheduler `CardStateRecord` per card
//!
//! Reads take a shared lock and return the whole document, so a snapshot
//! never observes a half-written file. A missing file is an empty store; an
//! unreadable or corrupt one is an error and is never replaced by defaults.
//!
//! Read-modify-write updates hold an exclusive lock on a sibling `*.lock`
//! file from the load until the rename, so concurrent writers serialize.

use crate::{CardStateRecord, Error, LessonProgress, LessonStatus, ProgressSnapshot, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Latest card state per card, as last written by the scheduler
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CardStateTable {
    pub cards: BTreeMap<String, CardStateRecord>,
}

impl CardStateTable {
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Store the state of one card in the table at `path`
    pub fn record(path: &Path, record: CardStateRecord) -> Result<()> {
        let _lock = lock_for_update(path)?;

        let mut table = Self::load(path)?;
        let card_id = record.card_id.clone();
        table.upsert(record);
        table.save(path)?;

        tracing::debug!("Stored card state for {}", card_id);
        Ok(())
    }

    /// Replace the state of one card
    pub fn upsert(&mut self, record: CardStateRecord) {
        self.cards.insert(record.card_id.clone(), record);
    }

    /// All tracked cards, ordered by card id
    pub fn records(&self) -> Vec<CardStateRecord> {
        self.cards.values().cloned().collect()
    }
}

impl ProgressSnapshot {
    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(self, path)
    }

    /// Record a learner interaction with a lesson
    ///
    /// Load, modify and save back under the same path.
    pub fn record(
        path: &Path,
        lesson_id: &str,
        status: LessonStatus,
        at: DateTime<Utc>,
    ) -> Result<LessonProgress> {
        let _lock = lock_for_update(path)?;

        let mut snapshot = Self::load(path)?;
        let progress = LessonProgress {
            lesson_id: lesson_id.to_string(),
            status,
            updated_at: at,
        };
        snapshot
            .lessons
            .insert(lesson_id.to_string(), progress.clone());
        snapshot.save(path)?;

        tracing::info!("Recorded {} as {}", lesson_id, status);
        Ok(progress)
    }
}

/// Path of the lock file guarding updates to `path`
pub fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Take the exclusive update lock for `path`
///
/// The lock is released when the returned file is dropped.
pub fn lock_for_update(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let lock_path = lock_path(path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| Error::Store(format!("Unable to open {:?}: {}", lock_path, e)))?;

    file.lock_exclusive()
        .map_err(|e| Error::Store(format!("Unable to lock {:?}: {}", lock_path, e)))?;

    Ok(file)
}

/// Load a JSON document with a shared lock
///
/// Returns the default value if the file doesn't exist.
pub fn load_json<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        tracing::debug!("No state file at {:?}, starting empty", path);
        return Ok(T::default());
    }

    let file = File::open(path)
        .map_err(|e| Error::Store(format!("Unable to open {:?}: {}", path, e)))?;

    file.lock_shared()
        .map_err(|e| Error::Store(format!("Unable to lock {:?}: {}", path, e)))?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read.map_err(|e| Error::Store(format!("Failed to read {:?}: {}", path, e)))?;

    let value = serde_json::from_str::<T>(&contents)
        .map_err(|e| Error::Store(format!("Failed to parse {:?}: {}", path, e)))?;

    tracing::debug!("Loaded state from {:?}", path);
    Ok(value)
}

/// Save a JSON document atomically
///
/// Writes to a temp file in the same directory, syncs it, then renames it
/// over the original.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
    })?)?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string_pretty(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved state to {:?}", path);
    Ok(())
}
