//! Pulse Gateway - HTTP API for the per-client command relay.
//!
//! This is the main entry point for the gateway service. It wires the
//! RocksDB store, the sync façade, and the Axum router together and
//! serves the public command endpoints plus the admin surface.
//!
//! # Configuration
//!
//! All configuration comes from environment variables with defaults:
//!
//! - `LISTEN_ADDR` - listen address (default `0.0.0.0:8080`)
//! - `DATA_DIR` - RocksDB data directory (default `/data/pulse`)
//! - `MAX_COMMAND_LEN` - maximum command value length in bytes
//! - `SESSION_TTL_SECONDS` - operator session lifetime
//! - `ADMIN_PASSWORD` - initial secret for the bootstrap admin account,
//!   only used when no admin record exists yet

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pulse_auth::SessionStore;
use pulse_gateway::{create_router, GatewayConfig, GatewayState};
use pulse_store::RocksStore;
use pulse_sync::{CommandSyncService, SyncConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pulse=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pulse Gateway");

    // Load configuration from environment
    let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into());
    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/pulse".into());

    let mut sync_config = SyncConfig::default();
    if let Ok(max_len) = std::env::var("MAX_COMMAND_LEN") {
        sync_config.max_command_len = max_len.parse()?;
    }
    if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
        sync_config.bootstrap_admin_password = password;
    }

    let mut gateway_config = GatewayConfig {
        listen_addr: listen_addr.clone(),
        ..GatewayConfig::default()
    };
    if let Ok(ttl) = std::env::var("SESSION_TTL_SECONDS") {
        gateway_config.session_ttl_seconds = ttl.parse()?;
    }

    tracing::info!(
        listen_addr = %listen_addr,
        data_dir = %data_dir,
        max_command_len = sync_config.max_command_len,
        session_ttl_seconds = gateway_config.session_ttl_seconds,
        "Gateway configuration loaded"
    );

    // Initialize RocksDB store
    tracing::info!(path = %data_dir, "Opening RocksDB store");
    let store = Arc::new(RocksStore::open(&data_dir)?);

    // Initialize the sync façade (runs admin bootstrap)
    let sessions = SessionStore::new(gateway_config.session_ttl());
    let sync = Arc::new(CommandSyncService::with_sessions(
        store,
        sync_config,
        sessions,
    )?);
    tracing::info!("Sync façade initialized");

    // Build gateway state and the full router
    let state = GatewayState::new(sync, gateway_config);
    let app = create_router(state);
    tracing::info!("Router configured with all API endpoints");

    // Start HTTP server
    tracing::info!(listen_addr = %listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
