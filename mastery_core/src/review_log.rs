//! Append-only review log.
//!
//! Review entries are appended to a JSONL (JSON Lines) file under an
//! exclusive lock. Entries are never rewritten or removed in place.
//!
//! Appends also hold the log's `*.lock` file, which archiving takes for the
//! whole read-archive-rename sequence, so no append can land in a log that
//! is being moved aside.

use crate::{Error, Result, ReviewLogEntry};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Destination for review log entries
pub trait ReviewLogSink {
    fn append(&mut self, entry: &ReviewLogEntry) -> Result<()>;
}

/// JSONL-based review log with file locking
pub struct JsonlReviewLog {
    path: PathBuf,
}

impl JsonlReviewLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl ReviewLogSink for JsonlReviewLog {
    fn append(&mut self, entry: &ReviewLogEntry) -> Result<()> {
        self.ensure_parent_dir()?;
        let _update = crate::state::lock_for_update(&self.path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(entry)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        tracing::debug!("Appended review {} for card {}", entry.id, entry.card_id);
        Ok(())
    }
}

/// Read all entries from a review log file
///
/// A missing file is an empty log. Lines that don't parse are skipped with a
/// warning; failing to open or read the file is a store error.
pub fn read_entries(path: &Path) -> Result<Vec<ReviewLogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)
        .map_err(|e| Error::Store(format!("Unable to open review log {:?}: {}", path, e)))?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut entries = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) => {
                let _ = file.unlock();
                return Err(Error::Store(format!(
                    "Failed to read review log {:?}: {}",
                    path, e
                )));
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<ReviewLogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping review log line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} entries from review log", entries.len());
    Ok(entries)
}
