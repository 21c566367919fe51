//! Review history loading across the live log and the CSV archive.

use crate::{Result, ReviewLogEntry};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;

/// Load review entries at or after `start` from both the live log and the archive
///
/// Returns entries sorted oldest first. An entry present in both files (a
/// rollup interrupted after the CSV write) is returned once.
pub fn load_logs_in_range(
    log_path: &Path,
    csv_path: &Path,
    start: DateTime<Utc>,
) -> Result<Vec<ReviewLogEntry>> {
    let mut entries = Vec::new();
    let mut seen_ids = HashSet::new();

    for entry in crate::review_log::read_entries(log_path)? {
        if entry.timestamp >= start && seen_ids.insert(entry.id) {
            entries.push(entry);
        }
    }
    let live_count = entries.len();

    for entry in crate::log_archive::read_archived_entries(csv_path)? {
        if entry.timestamp >= start && seen_ids.insert(entry.id) {
            entries.push(entry);
        }
    }

    entries.sort_by_key(|e| e.timestamp);

    tracing::debug!(
        "Loaded {} review entries since {} ({} live, {} archived)",
        entries.len(),
        start,
        live_count,
        entries.len() - live_count
    );

    Ok(entries)
}
