//! Curriculum loading, validation and ordered traversal.
//!
//! The curriculum is read-only content. Module and lesson orders define the
//! single curriculum-wide lesson sequence that the progression engine walks.

use crate::types::*;
use crate::{Error, Result};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

/// A lesson paired with the module that contains it
#[derive(Clone, Copy, Debug)]
pub struct OrderedLesson<'a> {
    pub module: &'a Module,
    pub lesson: &'a Lesson,
}

impl Curriculum {
    /// Load a curriculum from a JSON file and validate it
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Store(format!("Unable to read curriculum {:?}: {}", path, e))
        })?;
        let curriculum: Curriculum = serde_json::from_str(&contents)?;

        let errors = curriculum.validate();
        if !errors.is_empty() {
            return Err(Error::CurriculumValidation(errors.join("; ")));
        }

        tracing::debug!(
            "Loaded curriculum from {:?}: {} modules, {} lessons",
            path,
            curriculum.modules.len(),
            curriculum.lesson_count()
        );
        Ok(curriculum)
    }

    /// Modules sorted by ascending order
    pub fn ordered_modules(&self) -> Vec<&Module> {
        let mut modules: Vec<_> = self.modules.iter().collect();
        modules.sort_by_key(|m| m.order);
        modules
    }

    /// Lessons of one module sorted by ascending order
    pub fn lessons_for_module(&self, module_id: &str) -> Vec<&Lesson> {
        self.modules
            .iter()
            .find(|m| m.id == module_id)
            .map(sorted_lessons)
            .unwrap_or_default()
    }

    /// Every lesson in curriculum order: modules by order, then lessons by order
    pub fn ordered_lessons(&self) -> Vec<OrderedLesson<'_>> {
        self.ordered_modules()
            .into_iter()
            .flat_map(|module| {
                sorted_lessons(module)
                    .into_iter()
                    .map(move |lesson| OrderedLesson { module, lesson })
            })
            .collect()
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn contains_lesson(&self, lesson_id: &str) -> bool {
        self.modules
            .iter()
            .any(|m| m.lessons.iter().any(|l| l.id == lesson_id))
    }

    /// All card ids defined by content
    pub fn card_ids(&self) -> BTreeSet<&str> {
        self.modules
            .iter()
            .flat_map(|m| m.lessons.iter())
            .flat_map(|l| l.card_ids.iter().map(String::as_str))
            .collect()
    }

    /// Validate the curriculum
    ///
    /// Returns a list of validation errors (empty if valid).
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut module_ids = HashSet::new();
        let mut module_orders = HashSet::new();
        let mut lesson_ids = HashSet::new();
        let mut card_ids = HashSet::new();

        for module in &self.modules {
            if module.id.trim().is_empty() {
                errors.push("Module with empty id".to_string());
            }
            if !module_ids.insert(module.id.as_str()) {
                errors.push(format!("Duplicate module id '{}'", module.id));
            }
            if !module_orders.insert(module.order) {
                errors.push(format!(
                    "Module '{}' reuses order {}",
                    module.id, module.order
                ));
            }

            let mut lesson_orders = HashSet::new();
            for lesson in &module.lessons {
                if lesson.id.trim().is_empty() {
                    errors.push(format!("Lesson with empty id in module '{}'", module.id));
                }
                if !lesson_ids.insert(lesson.id.as_str()) {
                    errors.push(format!("Duplicate lesson id '{}'", lesson.id));
                }
                if !lesson_orders.insert(lesson.order) {
                    errors.push(format!(
                        "Lesson '{}' reuses order {} in module '{}'",
                        lesson.id, lesson.order, module.id
                    ));
                }
                for card_id in &lesson.card_ids {
                    if !card_ids.insert(card_id.as_str()) {
                        errors.push(format!("Duplicate card id '{}'", card_id));
                    }
                }
            }
        }

        errors
    }
}

fn sorted_lessons(module: &Module) -> Vec<&Lesson> {
    let mut lessons: Vec<_> = module.lessons.iter().collect();
    lessons.sort_by_key(|l| l.order);
    lessons
}
