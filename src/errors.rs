//! Unified error types and result handling.
//!
//! Every fallible operation in the crate returns [`Result`]. The HTTP layer turns
//! these into status codes in `api::error`; failures of external services use
//! [`crate::clients::FetchError`] instead and never reach this type.

use thiserror::Error;

/// Application error
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No user profile exists for this e-mail
    #[error("User not found: {email}")]
    UserNotFound {
        /// E-mail that was looked up
        email: String,
    },

    /// A user with this e-mail already signed up
    #[error("User already exists: {email}")]
    UserExists {
        /// E-mail that was already taken
        email: String,
    },

    /// No farm with this id belongs to the caller
    #[error("Farm not found: {farm_id}")]
    FarmNotFound {
        /// Farm id that was looked up
        farm_id: String,
    },

    /// The user's only remaining farm cannot be deleted
    #[error("Cannot delete the last farm: {farm_id}")]
    LastFarm {
        /// Farm id the caller tried to delete
        farm_id: String,
    },

    /// Request carried no caller identity
    #[error("Missing user identity")]
    Unauthenticated,

    /// Input failed validation
    #[error("Validation failed: {message}")]
    Validation {
        /// Which field failed and why
        message: String,
    },

    /// JSON encode/decode of a stored document failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable missing or not unicode
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
