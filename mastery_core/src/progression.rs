//! Lesson progression: sequential unlock over the whole curriculum.
//!
//! Rules:
//! - A persisted status always wins, even `locked` after a finished lesson
//! - Otherwise a lesson is `available` when the lesson before it in curriculum
//!   order is completed or mastered, and `locked` when it isn't
//! - The very first lesson has no predecessor and defaults to `available`
//!
//! The unlock chain crosses module boundaries, so the derivation is one fold
//! over the curriculum-wide sequence, never a per-module computation.

use crate::types::*;

/// Derive one lesson's effective status from its record and the previous lesson
pub fn next_status(persisted: Option<LessonStatus>, previous_done: bool) -> LessonStatus {
    match persisted {
        Some(status) => status,
        None if previous_done => LessonStatus::Available,
        None => LessonStatus::Locked,
    }
}

/// Effective status of every lesson, in curriculum order
///
/// `progress` returns the latest persisted status for a lesson id. Each lesson
/// appears exactly once in the output.
pub fn derive_lesson_statuses<F>(curriculum: &Curriculum, progress: F) -> Vec<LessonStatusEntry>
where
    F: Fn(&str) -> Option<LessonStatus>,
{
    let ordered = curriculum.ordered_lessons();

    let (_, entries) = ordered.iter().fold(
        (true, Vec::with_capacity(ordered.len())),
        |(previous_done, mut entries), item| {
            let persisted = progress(&item.lesson.id);
            let status = next_status(persisted, previous_done);

            entries.push(LessonStatusEntry {
                lesson_id: item.lesson.id.clone(),
                module_id: item.module.id.clone(),
                status,
                persisted: persisted.is_some(),
            });

            (status.is_done(), entries)
        },
    );

    tracing::debug!("Derived statuses for {} lessons", entries.len());
    entries
}

/// Progress records whose lesson is missing from the curriculum
///
/// These are ignored by the derivation; each one is reported so the caller can
/// surface the upstream data problem.
pub fn find_orphaned_progress(
    curriculum: &Curriculum,
    snapshot: &ProgressSnapshot,
) -> Vec<DataWarning> {
    snapshot
        .lessons
        .keys()
        .filter(|lesson_id| !curriculum.contains_lesson(lesson_id))
        .map(|lesson_id| {
            tracing::warn!("Ignoring progress for unknown lesson '{}'", lesson_id);
            DataWarning::OrphanedProgress {
                lesson_id: lesson_id.clone(),
            }
        })
        .collect()
}
