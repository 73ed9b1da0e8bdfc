//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use pulse_sync::CommandSync;

use crate::handlers::{admin, command, health};
use crate::state::GatewayState;

/// Create the gateway router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /command?clientId=<id>` - Poll the latest command
/// - `POST /command` - Submit a command (optional bearer session)
///
/// ## Admin (bearer session)
/// - `POST /admin/login` - Log in
/// - `POST /admin/logout` - Log out
/// - `GET /admin/clients` - List clients with latest commands
/// - `POST /admin/clients` - Create client
/// - `DELETE /admin/clients/:client_id` - Delete client by id
pub fn create_router<C>(state: GatewayState<C>) -> Router
where
    C: CommandSync + 'static,
{
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    // Build the router
    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Command relay
        .route(
            "/command",
            get(command::poll_command::<C>).post(command::submit_command::<C>),
        )
        // Admin surface
        .route("/admin/login", post(admin::login::<C>))
        .route("/admin/logout", post(admin::logout::<C>))
        .route(
            "/admin/clients",
            get(admin::list_clients::<C>).post(admin::create_client::<C>),
        )
        .route(
            "/admin/clients/:client_id",
            axum::routing::delete(admin::delete_client::<C>),
        )
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // For specific origins, parse them
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_any_origin() {
        let origins = vec!["*".to_string()];
        let _layer = build_cors_layer(&origins);
        // Just verify it doesn't panic
    }

    #[test]
    fn cors_specific_origins() {
        let origins = vec![
            "http://localhost:3000".to_string(),
            "https://app.example.com".to_string(),
        ];
        let _layer = build_cors_layer(&origins);
    }
}
