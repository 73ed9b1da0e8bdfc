//! Request, response, and configuration types for the sync façade.

use chrono::{DateTime, Utc};
use pulse_core::{ClientId, SessionToken};
use pulse_store::{ClientRecord, CommandRecord, Role};
use serde::{Deserialize, Serialize};

/// Who is submitting a command write.
#[derive(Debug, Clone)]
pub enum Submitter {
    /// An authenticated operator session. Admin sessions may target any
    /// client; client sessions only their own id.
    Session(SessionToken),
    /// An unauthenticated caller presenting the target client id itself.
    /// Possession of the unguessable id is the authorization.
    BearerId,
}

/// A client record joined with its latest command, as shown on the admin
/// listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientOverview {
    /// Stable opaque identifier.
    pub id: ClientId,
    /// Username.
    pub username: String,
    /// Account role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest command value, if any has been set.
    pub last_command: Option<String>,
    /// Timestamp of the latest command write, if any.
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl ClientOverview {
    /// Join a client record with its command record.
    ///
    /// Callers guarantee the record carries an id (always true after the
    /// open-time migration).
    #[must_use]
    pub fn join(client: &ClientRecord, command: Option<&CommandRecord>, id: ClientId) -> Self {
        Self {
            id,
            username: client.username.clone(),
            role: client.role,
            created_at: client.created_at,
            last_command: command.map(|c| c.value.clone()),
            last_timestamp: command.map(|c| c.updated_at),
        }
    }
}

/// Configuration for the sync façade.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Maximum accepted command value length, in bytes.
    pub max_command_len: usize,
    /// Username of the bootstrap admin account.
    pub bootstrap_admin_username: String,
    /// Initial secret of the bootstrap admin account. Only used when no
    /// admin record exists yet.
    pub bootstrap_admin_password: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_command_len: Self::default_max_command_len(),
            bootstrap_admin_username: "admin".to_string(),
            bootstrap_admin_password: "blackingbr".to_string(),
        }
    }
}

impl SyncConfig {
    const fn default_max_command_len() -> usize {
        256
    }
}
