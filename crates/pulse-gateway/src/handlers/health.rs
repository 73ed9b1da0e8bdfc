//! Liveness endpoint.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

/// Body returned by `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always `"ok"` while the process is serving requests.
    pub status: &'static str,
    /// Gateway crate version, for checking what a deployment runs.
    pub version: &'static str,
}

/// Liveness probe for the relay.
///
/// Public, unauthenticated, and answered before any store access: it
/// tells pollers and deploy tooling the process is up, not that the
/// database behind it is reachable.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(Health {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn liveness_answers_ok() {
        let response = health().await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
