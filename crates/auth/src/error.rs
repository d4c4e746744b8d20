//! Authentication error types

use gitadora_control::ControlError;
use thiserror::Error;

/// Result type for auth operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication operations
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token is missing or empty
    #[error("missing token")]
    MissingToken,

    /// Token format is invalid (not gsk_<jwt>)
    #[error("invalid token format")]
    InvalidTokenFormat,

    /// JWT signature verification failed
    #[error("invalid token signature")]
    InvalidSignature,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// Token is not yet valid (nbf claim)
    #[error("token not yet valid")]
    TokenNotYetValid,

    /// Token claims are invalid
    #[error("invalid token claims: {0}")]
    InvalidClaims(String),

    /// Email/password pair did not match
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Session not found in database
    #[error("session not found")]
    SessionNotFound,

    /// Session has expired
    #[error("session expired")]
    SessionExpired,

    /// Token refers to a user that no longer exists
    #[error("user not found")]
    UserNotFound,

    /// First-admin setup was already done
    #[error("setup already completed")]
    SetupCompleted,

    /// Rejected user input (email, password, display name)
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    /// Password hashing failure
    #[error("password error: {0}")]
    Password(String),

    /// Service misconfiguration
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage failure
    #[error(transparent)]
    Store(#[from] ControlError),
}

impl AuthError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Whether the error means the caller is not authenticated
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::MissingToken
                | Self::InvalidTokenFormat
                | Self::InvalidSignature
                | Self::TokenExpired
                | Self::TokenNotYetValid
                | Self::InvalidClaims(_)
                | Self::InvalidCredentials
                | Self::SessionNotFound
                | Self::SessionExpired
                | Self::UserNotFound
        )
    }
}
