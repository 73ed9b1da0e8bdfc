//! Error types for authentication and authorization.

use thiserror::Error;

/// A result type using `AuthError`.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur during authentication and authorization.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The username/secret pair did not verify.
    ///
    /// Deliberately identical for unknown usernames and wrong secrets, so
    /// callers cannot probe which usernames exist.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No valid session was presented.
    #[error("unauthenticated")]
    Unauthenticated,

    /// A valid session was presented, but its role does not permit the
    /// operation.
    #[error("forbidden")]
    Forbidden,

    /// Password hashing failed.
    #[error("hashing error: {0}")]
    Hash(String),

    /// Storage layer error.
    #[error("storage error: {0}")]
    Store(#[from] pulse_store::StoreError),
}
