//! Skill error types

use thiserror::Error;

/// Skill domain errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SkillError {
    /// Unknown instrument name
    #[error("invalid instrument type: {0}")]
    InvalidInstrument(String),

    /// Unknown difficulty name
    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),
}

/// Result type for skill operations
pub type Result<T> = std::result::Result<T, SkillError>;
