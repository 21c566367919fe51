//! Error types for the mastery_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for mastery_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Curriculum validation error
    #[error("Curriculum validation error: {0}")]
    CurriculumValidation(String),

    /// A snapshot could not be read from its store
    #[error("Store error: {0}")]
    Store(String),

    /// A lesson id that the curriculum does not define
    #[error("Unknown lesson: {0}")]
    UnknownLesson(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
