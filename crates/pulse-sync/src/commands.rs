//! Per-client command state: validation, normalization, and storage.
//!
//! Writes are full replacements with a fresh timestamp; the underlying
//! store guarantees atomic replace per key, so concurrent writers for the
//! same client leave exactly one of the submitted values.

use chrono::Utc;
use pulse_core::ClientId;
use pulse_store::{CommandRecord, Store};

use crate::error::{Result, SyncError};

/// The fixed command vocabulary that gets case-normalized. Anything else
/// is treated as a free-form message and stored as submitted (trimmed).
const FIXED_COMMANDS: [&str; 2] = ["start", "stop"];

/// Normalize a submitted command value.
///
/// Trims surrounding whitespace; values that case-insensitively match the
/// fixed vocabulary are lowercased.
#[must_use]
pub fn normalize(value: &str) -> String {
    let trimmed = value.trim();
    for fixed in FIXED_COMMANDS {
        if trimmed.eq_ignore_ascii_case(fixed) {
            return fixed.to_string();
        }
    }
    trimmed.to_string()
}

/// Replace the command for a client.
///
/// Validation happens before any storage write: the value is normalized,
/// then checked for emptiness and length, then the client's existence is
/// verified, and only then is the record replaced.
///
/// # Errors
///
/// Returns `SyncError::ValueEmpty`, `SyncError::ValueTooLong`, or
/// `SyncError::ClientNotFound`.
pub fn set_command<S: Store>(
    store: &S,
    client_id: &ClientId,
    value: &str,
    max_len: usize,
) -> Result<CommandRecord> {
    let value = normalize(value);
    if value.is_empty() {
        return Err(SyncError::ValueEmpty);
    }
    if value.len() > max_len {
        return Err(SyncError::ValueTooLong {
            max: max_len,
            got: value.len(),
        });
    }

    if store.get_client_by_id(client_id)?.is_none() {
        return Err(SyncError::ClientNotFound(client_id.clone()));
    }

    let record = CommandRecord {
        client_id: client_id.clone(),
        value,
        updated_at: Utc::now(),
    };
    store.put_command(&record)?;

    // A concurrent client deletion may have committed between the
    // existence check and the write, in which case the record just
    // written is an orphan. Re-check and roll it back so the command
    // record never outlives its client.
    if store.get_client_by_id(client_id)?.is_none() {
        store.delete_command(client_id)?;
        return Err(SyncError::ClientNotFound(client_id.clone()));
    }

    tracing::debug!(client_id = %client_id, value = %record.value, "Command set");
    Ok(record)
}

/// Read the latest command for a client.
///
/// Returns `Ok(None)` when the client exists but has never been
/// commanded; that is a normal state, not an error.
///
/// # Errors
///
/// Returns `SyncError::ClientNotFound` for unknown ids.
pub fn get_command<S: Store>(store: &S, client_id: &ClientId) -> Result<Option<CommandRecord>> {
    if store.get_client_by_id(client_id)?.is_none() {
        return Err(SyncError::ClientNotFound(client_id.clone()));
    }
    Ok(store.get_command(client_id)?)
}
