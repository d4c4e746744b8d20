//! Persistence error types

use thiserror::Error;

/// Persistence errors
#[derive(Debug, Error)]
pub enum ControlError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Entity already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Invalid data
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ControlError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an already exists error
    pub fn already_exists(entity: &'static str, id: impl ToString) -> Self {
        Self::AlreadyExists {
            entity,
            id: id.to_string(),
        }
    }

    /// Create an invalid data error
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Classify a failed INSERT/UPDATE
    ///
    /// Unique violations become `AlreadyExists` keyed by `key`; foreign key
    /// violations become `Invalid` on `field`.
    pub(crate) fn from_write(
        err: sqlx::Error,
        entity: &'static str,
        key: impl ToString,
        field: &'static str,
    ) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::already_exists(entity, key);
            }
            if db_err.is_foreign_key_violation() {
                return Self::invalid(field, "references an unknown row");
            }
        }
        Self::Database(err)
    }
}

/// Result type for persistence operations
pub type Result<T> = std::result::Result<T, ControlError>;
