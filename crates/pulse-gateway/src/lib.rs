//! HTTP gateway for the pulse command relay.
//!
//! This crate provides the public-facing API for polling and submitting
//! per-client commands, plus the authenticated admin surface. It handles:
//!
//! - The unauthenticated `GET /command` / `POST /command` relay endpoints
//! - Operator login and bearer-token session extraction
//! - Admin client management (create, delete, list)
//! - Request tracing, CORS, body limits, and timeouts
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Callers                              │
//! │            (polling clients / admin operators)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       pulse-gateway                         │
//! │  ┌─────────────┐ ┌─────────────┐ ┌─────────────────────┐    │
//! │  │   Session   │ │   Router    │ │    Admin            │    │
//! │  │  Extractor  │ │  + Handlers │ │    Handlers         │    │
//! │  └─────────────┘ └─────────────┘ └─────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//!                       ┌──────────┐
//!                       │   Sync   │
//!                       │  Façade  │
//!                       └──────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pulse_gateway::{GatewayConfig, GatewayState, create_router};
//! use pulse_sync::{CommandSyncService, SyncConfig};
//! use pulse_store::RocksStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Initialize dependencies
//! let store = Arc::new(RocksStore::open("/tmp/pulse")?);
//! let sync = Arc::new(CommandSyncService::new(store, SyncConfig::default())?);
//!
//! // Create gateway state
//! let config = GatewayConfig::default();
//! let state = GatewayState::new(sync, config);
//!
//! // Create router
//! let app = create_router(state);
//!
//! // Run server
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::GatewayConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::GatewayState;

// Re-export key types for convenience
pub use auth::{MaybeSession, SessionBearer};
