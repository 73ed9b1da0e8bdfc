//! Error types for the sync façade.
//!
//! This module defines all errors that can occur across registry, command,
//! and authorization operations, and their HTTP mapping.

use pulse_core::ClientId;
use thiserror::Error;

/// A result type using `SyncError`.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that can occur in sync façade operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The requested client was not found.
    #[error("client not found: {0}")]
    ClientNotFound(ClientId),

    /// A client with this username already exists.
    #[error("username already exists: {0}")]
    DuplicateUsername(String),

    /// The username is malformed.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// Admin records cannot be deleted.
    #[error("admin records cannot be deleted")]
    ForbiddenAdminDelete,

    /// The submitted command value is empty after normalization.
    ///
    /// Empty means "unset", which is represented by absence, never by
    /// writing an empty string.
    #[error("command value is empty")]
    ValueEmpty,

    /// The submitted command value exceeds the configured maximum length.
    #[error("command value too long: maximum {max} bytes, got {got}")]
    ValueTooLong {
        /// The configured maximum length.
        max: usize,
        /// The actual length.
        got: usize,
    },

    /// An invalid identifier was provided.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] pulse_core::IdError),

    /// Authentication or authorization error.
    #[error("auth error: {0}")]
    Auth(#[from] pulse_auth::AuthError),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] pulse_store::StoreError),
}

impl SyncError {
    /// Returns the appropriate HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::ClientNotFound(_) => 404,
            Self::DuplicateUsername(_) => 409,
            Self::InvalidUsername(_)
            | Self::ValueEmpty
            | Self::ValueTooLong { .. }
            | Self::InvalidId(_) => 400,
            Self::ForbiddenAdminDelete => 403,
            Self::Auth(err) => match err {
                pulse_auth::AuthError::InvalidCredentials
                | pulse_auth::AuthError::Unauthenticated => 401,
                pulse_auth::AuthError::Forbidden => 403,
                pulse_auth::AuthError::Hash(_) | pulse_auth::AuthError::Store(_) => 500,
            },
            Self::Store(_) => 500,
        }
    }
}
