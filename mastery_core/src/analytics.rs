//! Review analytics derived from scheduler snapshots.
//!
//! Three independent projections:
//! - Card-state histogram (tracked cards plus untracked cards counted as new)
//! - Weekly activity (7 local calendar days ending today)
//! - Review heatmap (28 local calendar days ending today)
//!
//! Day windows are anchored once per pass; every log entry is bucketed against
//! the same "today".

use crate::types::*;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use std::collections::{BTreeMap, BTreeSet};

pub const WEEKLY_DAYS: usize = 7;
pub const HEATMAP_DAYS: usize = 28;

/// Tally card states into a histogram that always sums to the content card count
///
/// Records for cards the content doesn't define are skipped. A card reported
/// twice counts once, using its last record. Content cards the scheduler has
/// never seen are counted as `new`.
pub fn card_state_histogram(
    records: &[CardStateRecord],
    content_cards: &BTreeSet<&str>,
) -> (CardStateHistogram, Vec<DataWarning>) {
    let mut warnings = Vec::new();
    let mut tracked: BTreeMap<&str, CardState> = BTreeMap::new();

    for record in records {
        let card_id = record.card_id.as_str();
        if !content_cards.contains(card_id) {
            tracing::warn!("Ignoring card state for unknown card '{}'", card_id);
            warnings.push(DataWarning::OrphanedCard {
                card_id: card_id.to_string(),
            });
            continue;
        }
        if tracked.insert(card_id, record.state).is_some() {
            tracing::warn!("Card '{}' reported more than once, keeping last", card_id);
            warnings.push(DataWarning::DuplicateCard {
                card_id: card_id.to_string(),
            });
        }
    }

    let mut histogram = CardStateHistogram::default();
    for state in tracked.values() {
        histogram.bump(*state);
    }
    histogram.new += content_cards.len() - tracked.len();

    (histogram, warnings)
}

/// A run of local calendar days ending today, fixed for one aggregation pass
#[derive(Clone, Debug)]
pub struct ActivityWindow<Tz: TimeZone> {
    tz: Tz,
    today: NaiveDate,
    days: usize,
}

impl<Tz: TimeZone> ActivityWindow<Tz> {
    /// Anchor a window of `days` days ending on the local date of `now`
    pub fn ending_at(now: &DateTime<Tz>, days: usize) -> Self {
        Self {
            tz: now.timezone(),
            today: now.date_naive(),
            days,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// First calendar day in the window
    pub fn first_day(&self) -> NaiveDate {
        self.today - Duration::days(self.days.saturating_sub(1) as i64)
    }

    /// Instant from which log entries can fall inside the window
    ///
    /// Local midnight of the first day. If that midnight doesn't exist (DST gap)
    /// the bound moves a day earlier; `bucket_of` still filters exactly.
    pub fn start_instant(&self) -> DateTime<Utc> {
        let midnight = self.first_day().and_time(chrono::NaiveTime::MIN);
        self.tz
            .from_local_datetime(&midnight)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc() - Duration::days(1))
    }

    /// Whole calendar days between today and the local date of `timestamp`
    pub fn day_offset(&self, timestamp: &DateTime<Utc>) -> i64 {
        let local_date = timestamp.with_timezone(&self.tz).date_naive();
        (self.today - local_date).num_days()
    }

    /// Bucket index (oldest first) for a timestamp, None when outside the window
    pub fn bucket_of(&self, timestamp: &DateTime<Utc>) -> Option<usize> {
        let offset = self.day_offset(timestamp);
        if offset < 0 || offset >= self.days as i64 {
            return None;
        }
        Some(self.days - 1 - offset as usize)
    }

    /// Count log entries per day, oldest day first
    pub fn bucket(&self, logs: &[ReviewLogEntry]) -> DaySeries {
        let mut counts = vec![0usize; self.days];
        let mut outside = 0usize;

        for entry in logs {
            match self.bucket_of(&entry.timestamp) {
                Some(index) => counts[index] += 1,
                None => outside += 1,
            }
        }

        if outside > 0 {
            tracing::debug!("{} review entries fell outside the {}-day window", outside, self.days);
        }

        let first_day = self.first_day();
        let days = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| {
                let date = first_day + Duration::days(i as i64);
                DayCount {
                    day_label: date.format("%a").to_string(),
                    date,
                    count,
                }
            })
            .collect();

        DaySeries { days }
    }
}

/// Reviews per day over the last 7 days, oldest first
pub fn weekly_activity<Tz: TimeZone>(logs: &[ReviewLogEntry], now: &DateTime<Tz>) -> DaySeries {
    ActivityWindow::ending_at(now, WEEKLY_DAYS).bucket(logs)
}

/// Reviews per day over the last 28 days, oldest first
pub fn review_heatmap<Tz: TimeZone>(logs: &[ReviewLogEntry], now: &DateTime<Tz>) -> DaySeries {
    ActivityWindow::ending_at(now, HEATMAP_DAYS).bucket(logs)
}
