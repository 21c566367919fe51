//! Dashboard pass: one snapshot in, every derived view out.
//!
//! The snapshot is fetched first; a failing read aborts the pass before any
//! derivation and the error reaches the caller unchanged. Everything after
//! the fetch is a pure function of the snapshot and `now`, so overlapping
//! passes are safe and the caller simply keeps the latest result.

use crate::analytics::{self, ActivityWindow, HEATMAP_DAYS};
use crate::mastery::{mastery_by_module, MasteryRule};
use crate::progression::{derive_lesson_statuses, find_orphaned_progress};
use crate::store::{LearnerSnapshot, LearnerStore};
use crate::types::*;
use crate::Result;
use chrono::{DateTime, TimeZone};
use serde::Serialize;

/// All derived views for one learner
#[derive(Clone, Debug, Serialize)]
pub struct Dashboard {
    pub lessons: Vec<LessonStatusEntry>,
    pub modules: Vec<ModuleMastery>,
    pub card_states: CardStateHistogram,
    pub weekly: DaySeries,
    pub heatmap: DaySeries,
    pub warnings: Vec<DataWarning>,
}

/// Fetch a snapshot from `store` and derive the dashboard from it
pub fn build_dashboard<S, Tz>(
    curriculum: &Curriculum,
    store: &S,
    now: &DateTime<Tz>,
    rule: MasteryRule,
) -> Result<Dashboard>
where
    S: LearnerStore + ?Sized,
    Tz: TimeZone,
{
    // The heatmap window covers the weekly one
    let logs_since = ActivityWindow::ending_at(now, HEATMAP_DAYS).start_instant();
    let snapshot = store.snapshot(logs_since)?;

    Ok(derive_dashboard(curriculum, &snapshot, now, rule))
}

/// Derive the dashboard from an already fetched snapshot
pub fn derive_dashboard<Tz: TimeZone>(
    curriculum: &Curriculum,
    snapshot: &LearnerSnapshot,
    now: &DateTime<Tz>,
    rule: MasteryRule,
) -> Dashboard {
    let mut warnings = find_orphaned_progress(curriculum, &snapshot.progress);

    let lessons = derive_lesson_statuses(curriculum, |id| snapshot.progress.status_of(id));
    let modules = mastery_by_module(curriculum, &lessons, rule);

    let (card_states, card_warnings) =
        analytics::card_state_histogram(&snapshot.card_states, &curriculum.card_ids());
    warnings.extend(card_warnings);

    let weekly = analytics::weekly_activity(&snapshot.reviews, now);
    let heatmap = analytics::review_heatmap(&snapshot.reviews, now);

    tracing::info!(
        "Dashboard: {} lessons, {} modules, {} cards, {} reviews this week, {} warnings",
        lessons.len(),
        modules.len(),
        card_states.total(),
        weekly.total(),
        warnings.len()
    );

    Dashboard {
        lessons,
        modules,
        card_states,
        weekly,
        heatmap,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::fixtures::*;
    use crate::{Error, ProgressSnapshot};
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    struct MemoryStore {
        snapshot: LearnerSnapshot,
    }

    impl LearnerStore for MemoryStore {
        fn progress(&self) -> Result<ProgressSnapshot> {
            Ok(self.snapshot.progress.clone())
        }

        fn card_states(&self) -> Result<Vec<CardStateRecord>> {
            Ok(self.snapshot.card_states.clone())
        }

        fn logs_in_range(&self, start: chrono::DateTime<Utc>) -> Result<Vec<ReviewLogEntry>> {
            Ok(self
                .snapshot
                .reviews
                .iter()
                .filter(|e| e.timestamp >= start)
                .cloned()
                .collect())
        }
    }

    struct BrokenStore;

    impl LearnerStore for BrokenStore {
        fn progress(&self) -> Result<ProgressSnapshot> {
            Ok(ProgressSnapshot::default())
        }

        fn card_states(&self) -> Result<Vec<CardStateRecord>> {
            Err(Error::Store("scheduler unavailable".into()))
        }

        fn logs_in_range(&self, _start: chrono::DateTime<Utc>) -> Result<Vec<ReviewLogEntry>> {
            Ok(Vec::new())
        }
    }

    fn progress(records: &[(&str, LessonStatus)]) -> ProgressSnapshot {
        let mut snapshot = ProgressSnapshot::default();
        for (id, status) in records {
            snapshot.lessons.insert(
                id.to_string(),
                LessonProgress {
                    lesson_id: id.to_string(),
                    status: *status,
                    updated_at: Utc::now(),
                },
            );
        }
        snapshot
    }

    fn review(card_id: &str, timestamp: chrono::DateTime<Utc>) -> ReviewLogEntry {
        ReviewLogEntry {
            id: Uuid::new_v4(),
            card_id: card_id.into(),
            timestamp,
        }
    }

    fn curriculum_with_cards() -> Curriculum {
        Curriculum {
            modules: vec![
                module("m1", 1, vec![lesson("l1", 1, &["c1", "c2"]), lesson("l2", 2, &["c3"])]),
                module("m2", 2, vec![lesson("l3", 1, &["c4"]), lesson("l4", 2, &[])]),
            ],
        }
    }

    #[test]
    fn test_dashboard_combines_every_view() {
        crate::logging::init_test();
        let curriculum = curriculum_with_cards();
        let now = Utc::now();

        let store = MemoryStore {
            snapshot: LearnerSnapshot {
                progress: progress(&[("l1", LessonStatus::Completed), ("gone", LessonStatus::Mastered)]),
                card_states: vec![
                    CardStateRecord {
                        card_id: "c1".into(),
                        state: CardState::Review,
                        due: None,
                    },
                    CardStateRecord {
                        card_id: "zz".into(),
                        state: CardState::Learning,
                        due: None,
                    },
                ],
                reviews: vec![
                    review("c1", now),
                    review("c1", now - Duration::days(10)),
                    review("c1", now - Duration::days(60)),
                ],
            },
        };

        let dashboard = build_dashboard(&curriculum, &store, &now, MasteryRule::Detailed).unwrap();

        let statuses: Vec<_> = dashboard.lessons.iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                LessonStatus::Completed,
                LessonStatus::Available,
                LessonStatus::Locked,
                LessonStatus::Locked,
            ]
        );
        assert_eq!(dashboard.modules[0].level, MasteryLevel::Learning);
        assert_eq!(dashboard.modules[1].level, MasteryLevel::New);

        assert_eq!(dashboard.card_states.review, 1);
        assert_eq!(dashboard.card_states.new, 3);
        assert_eq!(dashboard.card_states.total(), 4);

        assert_eq!(dashboard.weekly.total(), 1);
        assert_eq!(dashboard.heatmap.total(), 2);

        assert_eq!(dashboard.warnings.len(), 2);
        assert!(dashboard.warnings.contains(&DataWarning::OrphanedProgress {
            lesson_id: "gone".into()
        }));
        assert!(dashboard.warnings.contains(&DataWarning::OrphanedCard {
            card_id: "zz".into()
        }));
    }

    #[test]
    fn test_store_failure_propagates() {
        let result = build_dashboard(
            &curriculum_with_cards(),
            &BrokenStore,
            &Utc::now(),
            MasteryRule::Detailed,
        );
        assert!(matches!(result, Err(Error::Store(_))));
    }

    #[test]
    fn test_same_snapshot_same_dashboard() {
        let curriculum = curriculum_with_cards();
        let now = Utc::now();
        let snapshot = LearnerSnapshot {
            progress: progress(&[("l1", LessonStatus::Mastered), ("l2", LessonStatus::Mastered)]),
            card_states: Vec::new(),
            reviews: vec![review("c2", now - Duration::hours(3))],
        };

        let first = derive_dashboard(&curriculum, &snapshot, &now, MasteryRule::Coarse);
        let second = derive_dashboard(&curriculum, &snapshot, &now, MasteryRule::Coarse);

        assert_eq!(first.lessons, second.lessons);
        assert_eq!(first.modules, second.modules);
        assert_eq!(first.weekly, second.weekly);
        assert_eq!(first.heatmap, second.heatmap);
        assert_eq!(first.modules[0].level, MasteryLevel::Proficient);
    }

    #[test]
    fn test_no_activity_yields_zero_buckets() {
        let curriculum = curriculum_with_cards();
        let dashboard = derive_dashboard(
            &curriculum,
            &LearnerSnapshot::default(),
            &Utc::now(),
            MasteryRule::Detailed,
        );

        assert!(dashboard.weekly.is_empty());
        assert!(dashboard.heatmap.is_empty());
        assert_eq!(dashboard.weekly.days.len(), 7);
        assert_eq!(dashboard.card_states.new, 4);
    }
}
