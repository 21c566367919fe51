//! Module mastery aggregation.
//!
//! Two rules exist side by side. `module_mastery` distinguishes a fully
//! mastered module from a fully completed one; `coarse_module_mastery`
//! collapses both into `proficient` and never reports `mastered`.

use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which aggregation rule to apply per module
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MasteryRule {
    /// new / learning / proficient / mastered
    #[default]
    Detailed,
    /// new / learning / proficient
    Coarse,
}

impl MasteryRule {
    pub fn apply(self, statuses: &[LessonStatus]) -> MasteryLevel {
        match self {
            MasteryRule::Detailed => module_mastery(statuses),
            MasteryRule::Coarse => coarse_module_mastery(statuses),
        }
    }
}

struct Tally {
    total: usize,
    mastered: usize,
    done: usize,
}

fn tally(statuses: &[LessonStatus]) -> Tally {
    Tally {
        total: statuses.len(),
        mastered: statuses
            .iter()
            .filter(|s| **s == LessonStatus::Mastered)
            .count(),
        done: statuses.iter().filter(|s| s.is_done()).count(),
    }
}

/// Reduce a module's lesson statuses to one mastery level
///
/// First match wins:
/// 1. no lessons → new
/// 2. every lesson mastered → mastered
/// 3. every lesson completed or mastered → proficient
/// 4. any lesson completed or mastered → learning
/// 5. otherwise → new
pub fn module_mastery(statuses: &[LessonStatus]) -> MasteryLevel {
    let t = tally(statuses);

    if t.total == 0 {
        MasteryLevel::New
    } else if t.mastered == t.total {
        MasteryLevel::Mastered
    } else if t.done == t.total {
        MasteryLevel::Proficient
    } else if t.done > 0 {
        MasteryLevel::Learning
    } else {
        MasteryLevel::New
    }
}

/// Two-branch variant: nothing done → new, everything done → proficient,
/// anything in between → learning
pub fn coarse_module_mastery(statuses: &[LessonStatus]) -> MasteryLevel {
    let t = tally(statuses);

    if t.done == 0 {
        MasteryLevel::New
    } else if t.done == t.total {
        MasteryLevel::Proficient
    } else {
        MasteryLevel::Learning
    }
}

/// Mastery of every module, in module order
pub fn mastery_by_module(
    curriculum: &Curriculum,
    statuses: &[LessonStatusEntry],
    rule: MasteryRule,
) -> Vec<ModuleMastery> {
    let mut by_module: HashMap<&str, Vec<LessonStatus>> = HashMap::new();
    for entry in statuses {
        by_module
            .entry(entry.module_id.as_str())
            .or_default()
            .push(entry.status);
    }

    curriculum
        .ordered_modules()
        .into_iter()
        .map(|module| {
            let lesson_statuses = by_module
                .get(module.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            ModuleMastery {
                module_id: module.id.clone(),
                level: rule.apply(lesson_statuses),
            }
        })
        .collect()
}
