//! Sync façade for the pulse command relay.
//!
//! This crate provides the core business logic of the system: the identity
//! registry, the per-client command state, and the operations that compose
//! them with access control into the externally visible API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Gateway (HTTP)                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   CommandSyncService                        │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐   │
//! │  │  Identity   │ │  Command    │ │    Access           │   │
//! │  │  Registry   │ │  State      │ │    Control          │   │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌──────────┐
//!                       │  Store   │
//!                       │ (RocksDB)│
//!                       └──────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use pulse_store::RocksStore;
//! use pulse_sync::{CommandSync, CommandSyncService, SyncConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(RocksStore::open("/tmp/pulse")?);
//! let service = CommandSyncService::new(store, SyncConfig::default())?;
//!
//! // Operator path
//! let session = service.login("admin", "blackingbr").await?;
//! let client = service
//!     .create_client(&session.token, "client01", "hunter2")
//!     .await?;
//!
//! // Polling path: the client id alone authorizes the read
//! let id = client.id().unwrap();
//! let command = service.poll_command(id).await?;
//! assert!(command.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! # State machine
//!
//! Per client, the command state is `UNSET` until the first write and `SET`
//! afterwards; every subsequent write fully replaces the value and
//! timestamp. There is no terminal state; the record lives exactly as long
//! as its owning client.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod commands;
pub mod error;
pub mod registry;
pub mod service;
pub mod types;

pub use error::{Result, SyncError};
pub use registry::Registry;
pub use service::{CommandSync, CommandSyncService};
pub use types::{ClientOverview, Submitter, SyncConfig};

// Re-export commonly used types from dependencies for convenience
pub use pulse_auth::Session;
pub use pulse_core::{ClientId, SessionToken};
pub use pulse_store::{ClientRecord, CommandRecord, Role};
