//! Core domain types for the mastery engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Curriculum content (modules and lessons)
//! - Persisted learner progress and scheduler card state
//! - Review log entries
//! - Derived outputs (effective statuses, mastery levels, analytics series)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Content Types
// ============================================================================

/// A single lesson inside a module
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub order: u32,
    #[serde(default)]
    pub estimated_minutes: u32,
    /// Review cards defined by this lesson's content
    #[serde(default)]
    pub card_ids: Vec<String>,
}

/// An ordered group of lessons
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Module {
    pub id: String,
    pub order: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// The complete content graph: every module with its lessons
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Curriculum {
    #[serde(default)]
    pub modules: Vec<Module>,
}

// ============================================================================
// Progress Types
// ============================================================================

/// Status of a lesson, either persisted or derived by the progression engine
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum LessonStatus {
    Locked,
    Available,
    InProgress,
    Completed,
    Mastered,
}

impl LessonStatus {
    /// Whether this status unlocks the next lesson in curriculum order
    pub fn is_done(self) -> bool {
        matches!(self, LessonStatus::Completed | LessonStatus::Mastered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LessonStatus::Locked => "locked",
            LessonStatus::Available => "available",
            LessonStatus::InProgress => "in-progress",
            LessonStatus::Completed => "completed",
            LessonStatus::Mastered => "mastered",
        }
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for LessonStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "locked" => Ok(LessonStatus::Locked),
            "available" => Ok(LessonStatus::Available),
            "in-progress" => Ok(LessonStatus::InProgress),
            "completed" => Ok(LessonStatus::Completed),
            "mastered" => Ok(LessonStatus::Mastered),
            other => Err(crate::Error::Other(format!(
                "Unknown lesson status: {}",
                other
            ))),
        }
    }
}

/// Persisted progress record for one lesson
///
/// Created on first learner interaction. The progression engine only reads
/// these; it never creates or rewrites one.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LessonProgress {
    pub lesson_id: String,
    pub status: LessonStatus,
    pub updated_at: DateTime<Utc>,
}

/// Latest progress record per lesson, as read from the progress store
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub lessons: BTreeMap<String, LessonProgress>,
}

impl ProgressSnapshot {
    /// Latest persisted status for a lesson, if the learner ever touched it
    pub fn status_of(&self, lesson_id: &str) -> Option<LessonStatus> {
        self.lessons.get(lesson_id).map(|p| p.status)
    }
}

// ============================================================================
// Scheduler Types
// ============================================================================

/// Card state as reported by the external spaced-repetition scheduler
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CardState {
    New,
    Learning,
    Review,
    Relearning,
}

impl FromStr for CardState {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "new" => Ok(CardState::New),
            "learning" => Ok(CardState::Learning),
            "review" => Ok(CardState::Review),
            "relearning" => Ok(CardState::Relearning),
            other => Err(crate::Error::Other(format!("Unknown card state: {}", other))),
        }
    }
}

/// A tracked card: one the scheduler has seen at least once
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardStateRecord {
    pub card_id: String,
    pub state: CardState,
    #[serde(default)]
    pub due: Option<DateTime<Utc>>,
}

/// Append-only review log entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewLogEntry {
    pub id: Uuid,
    pub card_id: String,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Derived Types
// ============================================================================

/// Module-wide mastery summary. Derived, never persisted.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    New,
    Learning,
    Proficient,
    Mastered,
}

impl fmt::Display for MasteryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MasteryLevel::New => "new",
            MasteryLevel::Learning => "learning",
            MasteryLevel::Proficient => "proficient",
            MasteryLevel::Mastered => "mastered",
        };
        f.pad(s)
    }
}

/// Effective status of one lesson, in curriculum order
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LessonStatusEntry {
    pub lesson_id: String,
    pub module_id: String,
    pub status: LessonStatus,
    /// True when the status came from a persisted record rather than the default
    pub persisted: bool,
}

/// Mastery level of one module
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ModuleMastery {
    pub module_id: String,
    pub level: MasteryLevel,
}

/// Count of cards per scheduler state, untracked cards folded into `new`
#[derive(Clone, Copy, Debug, Serialize, Default, PartialEq, Eq)]
pub struct CardStateHistogram {
    pub new: usize,
    pub learning: usize,
    pub review: usize,
    pub relearning: usize,
}

impl CardStateHistogram {
    pub fn total(&self) -> usize {
        self.new + self.learning + self.review + self.relearning
    }

    pub(crate) fn bump(&mut self, state: CardState) {
        match state {
            CardState::New => self.new += 1,
            CardState::Learning => self.learning += 1,
            CardState::Review => self.review += 1,
            CardState::Relearning => self.relearning += 1,
        }
    }
}

/// Review count for one local calendar day
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DayCount {
    /// Short weekday name, e.g. "Mon"
    pub day_label: String,
    pub date: NaiveDate,
    pub count: usize,
}

/// Day buckets ordered oldest to newest
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct DaySeries {
    pub days: Vec<DayCount>,
}

impl DaySeries {
    pub fn total(&self) -> usize {
        self.days.iter().map(|d| d.count).sum()
    }

    /// True when no review landed in the window
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Data problems found while deriving; surfaced to the caller, never fatal
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataWarning {
    /// A progress record points at a lesson missing from the curriculum
    OrphanedProgress { lesson_id: String },
    /// A card state points at a card missing from the curriculum
    OrphanedCard { card_id: String },
    /// The scheduler reported the same card more than once
    DuplicateCard { card_id: String },
}

impl fmt::Display for DataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataWarning::OrphanedProgress { lesson_id } => {
                write!(f, "progress for unknown lesson '{}'", lesson_id)
            }
            DataWarning::OrphanedCard { card_id } => {
                write!(f, "card state for unknown card '{}'", card_id)
            }
            DataWarning::DuplicateCard { card_id } => {
                write!(f, "card '{}' tracked more than once", card_id)
            }
        }
    }
}
