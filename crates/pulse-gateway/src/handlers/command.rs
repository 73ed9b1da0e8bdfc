//! Command relay endpoints.
//!
//! This module provides the two client-facing endpoints: polling the
//! latest command and submitting a replacement. Both share one response
//! shape so that thin polling clients can parse a single schema.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use pulse_core::ClientId;
use pulse_store::CommandRecord;
use pulse_sync::{CommandSync, Submitter, SyncError};

use crate::auth::MaybeSession;
use crate::error::ApiError;
use crate::state::GatewayState;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for command polling.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollQuery {
    /// The client identifier to poll for.
    pub client_id: String,
}

/// Request to submit a command.
///
/// Strict schema: unknown fields are rejected so a misspelled field does
/// not silently turn into a no-op.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SubmitBody {
    /// The target client identifier.
    pub client_id: String,
    /// The command value to store.
    pub command: String,
}

/// Shared response shape for both command endpoints.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The latest command value, if any.
    pub command: Option<String>,
    /// Unix timestamp (seconds) of the latest command write, if any.
    pub timestamp: Option<i64>,
}

impl CommandResponse {
    fn of(record: &CommandRecord) -> Self {
        Self {
            success: true,
            command: Some(record.value.clone()),
            timestamp: Some(record.updated_at.timestamp()),
        }
    }

    const fn empty() -> Self {
        Self {
            success: true,
            command: None,
            timestamp: None,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Poll the latest command for a client.
///
/// Unknown clients are reported as "no command" rather than 404: polling
/// clients keep running against a registry they cannot inspect, and the
/// endpoint must not confirm which identifiers exist.
///
/// # Errors
///
/// Returns 400 for malformed identifiers, before any storage access.
pub async fn poll_command<C>(
    State(state): State<Arc<GatewayState<C>>>,
    Query(query): Query<PollQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    C: CommandSync + 'static,
{
    let client_id = ClientId::parse(&query.client_id)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    match state.sync.poll_command(&client_id).await {
        Ok(Some(record)) => Ok(Json(CommandResponse::of(&record))),
        Ok(None) | Err(SyncError::ClientNotFound(_)) => Ok(Json(CommandResponse::empty())),
        Err(err) => Err(err.into()),
    }
}

/// Submit a command for a client.
///
/// With a bearer session the write is authorized by role and ownership;
/// without one, possession of the target id itself authorizes the write.
///
/// # Errors
///
/// Returns 400 for malformed ids and invalid values, 404 for unknown
/// clients, 401/403 for session failures.
pub async fn submit_command<C>(
    State(state): State<Arc<GatewayState<C>>>,
    MaybeSession(token): MaybeSession,
    Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
    C: CommandSync + 'static,
{
    let client_id = ClientId::parse(&body.client_id)
        .map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let submitter = match token {
        Some(token) => Submitter::Session(token),
        None => Submitter::BearerId,
    };

    let record = state
        .sync
        .submit_command(&submitter, &client_id, &body.command)
        .await?;

    Ok(Json(CommandResponse::of(&record)))
}
