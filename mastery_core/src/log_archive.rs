//! Review log archiving to CSV.
//!
//! The live JSONL log is appended to `reviews.csv` and then renamed to
//! `*.jsonl.processed`. The CSV is synced before the rename so an entry is
//! never only in a file about to disappear. The log's update lock is held
//! from the read until after the rename; appends wait on the same lock.

use crate::{Result, ReviewLogEntry};
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::path::Path;
use uuid::Uuid;

/// A row in the archive CSV
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: String,
    card_id: String,
    timestamp: String,
}

impl From<&ReviewLogEntry> for CsvRow {
    fn from(entry: &ReviewLogEntry) -> Self {
        CsvRow {
            id: entry.id.to_string(),
            card_id: entry.card_id.clone(),
            timestamp: entry.timestamp.to_rfc3339(),
        }
    }
}

impl TryFrom<CsvRow> for ReviewLogEntry {
    type Error = crate::Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| crate::Error::Other(format!("Invalid UUID: {}", e)))?;

        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| crate::Error::Other(format!("Invalid date: {}", e)))?
            .with_timezone(&Utc);

        Ok(ReviewLogEntry {
            id,
            card_id: row.card_id,
            timestamp,
        })
    }
}

/// Move every entry of the live log into the CSV archive
///
/// Returns the number of entries archived.
pub fn archive_log_to_csv(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let _update = crate::state::lock_for_update(log_path)?;
    let entries = crate::review_log::read_entries(log_path)?;

    if entries.is_empty() {
        tracing::info!("No review entries to archive");
        return Ok(0);
    }

    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(csv_path)?;

    // Headers only go into a fresh file
    let needs_headers = file.metadata()?.len() == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_headers)
        .from_writer(file);

    for entry in &entries {
        writer.serialize(CsvRow::from(entry))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Archived {} review entries to CSV", entries.len());

    let processed_path = log_path.with_extension("jsonl.processed");
    std::fs::rename(log_path, &processed_path)?;

    tracing::info!("Moved review log to {:?}", processed_path);

    Ok(entries.len())
}

/// Remove archived `.processed` logs from a directory
pub fn cleanup_processed_logs(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let mut count = 0;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.extension().is_some_and(|ext| ext == "processed") && path.is_file() {
            std::fs::remove_file(&path)?;
            tracing::debug!("Removed processed log: {:?}", path);
            count += 1;
        }
    }

    if count > 0 {
        tracing::info!("Cleaned up {} processed review logs", count);
    }

    Ok(count)
}

/// Read all archived entries from a CSV file
///
/// Rows that don't parse are skipped with a warning.
pub fn read_archived_entries(path: &Path) -> Result<Vec<ReviewLogEntry>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut entries = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        match result.map_err(crate::Error::from).and_then(ReviewLogEntry::try_from) {
            Ok(entry) => entries.push(entry),
            Err(e) => tracing::warn!("Skipping archived review row: {}", e),
        }
    }

    Ok(entries)
}
