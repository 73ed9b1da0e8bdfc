//! Credential verification and session management for pulse.
//!
//! This crate owns the access-control primitives of the command relay:
//!
//! - **Password hashing**: argon2id with per-hash random salts, plus
//!   outdated-hash detection for migration-on-login
//! - **Sessions**: ephemeral in-process session records keyed by an opaque
//!   token, with lazy expiry
//! - **Access control**: `verify_credentials`, `issue_session`,
//!   `require_role`, and `end_session`
//!
//! Authorization *decisions* (which caller may perform which operation)
//! are composed by the sync façade from these primitives.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod access;
pub mod error;
pub mod password;
pub mod session;

pub use access::AccessControl;
pub use error::{AuthError, Result};
pub use session::{Session, SessionStore};
