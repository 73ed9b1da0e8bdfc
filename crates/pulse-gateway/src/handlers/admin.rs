//! Admin surface endpoints.
//!
//! This module provides operator login/logout and client management. All
//! management handlers take a bearer session token; role checks happen in
//! the sync façade.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pulse_core::ClientId;
use pulse_sync::{ClientOverview, CommandSync};

use crate::auth::SessionBearer;
use crate::error::ApiError;
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Request to log in.
#[derive(Debug, Deserialize)]
pub struct LoginBody {
    /// Account username.
    pub username: String,
    /// Account secret.
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

/// Request to create a client account.
#[derive(Debug, Deserialize)]
pub struct CreateClientBody {
    /// Username for the new account.
    pub username: String,
    /// Secret for the new account.
    pub secret: String,
}

/// Response for a created client.
#[derive(Debug, Serialize)]
pub struct CreateClientResponse {
    /// The minted client identifier.
    pub id: String,
    /// The account username.
    pub username: String,
}

/// Response for the client listing.
#[derive(Debug, Serialize)]
pub struct ListClientsResponse {
    /// Clients in creation order, each joined with its latest command.
    pub clients: Vec<ClientOverview>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Log in with username and password.
///
/// # Errors
///
/// Returns 401 for unknown usernames and wrong passwords alike.
pub async fn login<C>(
    State(state): State<Arc<GatewayState<C>>>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
    C: CommandSync + 'static,
{
    let session = state.sync.login(&body.username, &body.password).await?;

    let response = LoginResponse {
        token: session.token.to_string(),
        expires_at: session.expires_at,
    };

    Ok(Json(response))
}

/// Log out, ending the session. Idempotent.
///
/// # Errors
///
/// Returns 401 when the bearer header is missing or malformed.
pub async fn logout<C>(
    State(state): State<Arc<GatewayState<C>>>,
    SessionBearer(token): SessionBearer,
) -> Result<impl IntoResponse, ApiError>
where
    C: CommandSync + 'static,
{
    state.sync.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a new client account. Admin only.
///
/// # Errors
///
/// Returns 401/403 for session failures, 409 for duplicate usernames,
/// 400 for malformed usernames.
pub async fn create_client<C>(
    State(state): State<Arc<GatewayState<C>>>,
    SessionBearer(token): SessionBearer,
    Json(body): Json<CreateClientBody>,
) -> Result<impl IntoResponse, ApiError>
where
    C: CommandSync + 'static,
{
    let record = state
        .sync
        .create_client(&token, &body.username, &body.secret)
        .await?;

    // Freshly created records always carry an id; a missing one is a bug
    // worth a 500, not an empty string in the response.
    let id = record
        .id()
        .ok_or_else(|| ApiError::Internal("created client has no id".to_string()))?
        .to_string();

    let response = CreateClientResponse {
        id,
        username: record.username,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Delete a client account by id. Admin only.
///
/// # Errors
///
/// Returns 404 for unknown ids, 403 for admin targets, 400 for malformed
/// ids.
pub async fn delete_client<C>(
    State(state): State<Arc<GatewayState<C>>>,
    SessionBearer(token): SessionBearer,
    Path(client_id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    C: CommandSync + 'static,
{
    let client_id =
        ClientId::parse(&client_id).map_err(|err| ApiError::BadRequest(err.to_string()))?;

    state.sync.delete_client(&token, &client_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List all client accounts with their latest commands. Admin only.
///
/// # Errors
///
/// Returns 401/403 for session failures.
pub async fn list_clients<C>(
    State(state): State<Arc<GatewayState<C>>>,
    SessionBearer(token): SessionBearer,
) -> Result<impl IntoResponse, ApiError>
where
    C: CommandSync + 'static,
{
    let clients = state.sync.list_clients(&token).await?;
    Ok(Json(ListClientsResponse { clients }))
}
