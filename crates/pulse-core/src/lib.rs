//! Core types and utilities for pulse.
//!
//! This crate provides the foundational types used throughout the pulse
//! command relay:
//!
//! - **Identifiers**: the opaque `ClientId` bearer identifier and the
//!   `SessionToken` used for operator sessions, with parse errors that
//!   downstream crates convert into their own error enums
//!
//! # Example
//!
//! ```
//! use pulse_core::{ClientId, SessionToken};
//!
//! // Mint a fresh random client identifier (32 hex chars)
//! let client_id = ClientId::random();
//! assert_eq!(client_id.as_str().len(), 32);
//!
//! // Parse one supplied by a caller
//! let parsed = ClientId::parse("client-01_test").unwrap();
//!
//! // Generate a session token
//! let token = SessionToken::generate();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;

pub use ids::{mint_unique, ClientId, IdError, SessionToken};
