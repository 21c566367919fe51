#![forbid(unsafe_code)]

//! Core domain model and business logic for the learning progression engine.
//!
//! This crate provides:
//! - Domain types (curriculum, progress, card states, review log)
//! - Progression engine (sequential lesson unlock)
//! - Module mastery aggregation
//! - Review analytics (card-state histogram, weekly activity, heatmap)
//! - Snapshot stores (progress/card state files, review log and archive)

pub mod types;
pub mod error;
pub mod curriculum;
pub mod config;
pub mod logging;
pub mod state;
pub mod review_log;
pub mod log_archive;
pub mod history;
pub mod store;
pub mod progression;
pub mod mastery;
pub mod analytics;
pub mod engine;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use state::CardStateTable;
pub use review_log::{JsonlReviewLog, ReviewLogSink};
pub use store::{FileStore, LearnerSnapshot, LearnerStore};
pub use progression::derive_lesson_statuses;
pub use mastery::{coarse_module_mastery, module_mastery, MasteryRule};
pub use analytics::{card_state_histogram, review_heatmap, weekly_activity};
pub use engine::{build_dashboard, Dashboard};
