//! Domain types stored in the database.
//!
//! These types represent the persisted state of clients and their commands.

use chrono::{DateTime, Utc};
use pulse_core::ClientId;
use serde::{Deserialize, Serialize};

/// The role of a registered account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator: manages clients and operates the panel.
    Admin,
    /// Regular client: polls for its own command.
    Client,
}

impl Role {
    /// Whether this role is the administrator role.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A client record stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Opaque stable identifier, unique across all records.
    ///
    /// `None` only on legacy records that predate the id field; the
    /// migration at store open backfills these, so records read through a
    /// freshly opened store always carry an id.
    #[serde(default)]
    pub id: Option<ClientId>,
    /// Unique, immutable username used for authentication.
    pub username: String,
    /// Argon2id PHC hash of the account secret.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Creation timestamp, immutable.
    pub created_at: DateTime<Utc>,
    /// Creation sequence number; drives insertion-order listing.
    pub seq: u64,
}

impl ClientRecord {
    /// The record's id, if assigned.
    #[must_use]
    pub const fn id(&self) -> Option<&ClientId> {
        self.id.as_ref()
    }
}

/// The latest command for a client.
///
/// At most one record exists per client; every write is a full
/// replacement. Absence encodes "no command yet".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandRecord {
    /// The client this command targets. Weak reference: the record is
    /// removed together with its client.
    pub client_id: ClientId,
    /// The command value. Bounded length, never empty.
    pub value: String,
    /// Timestamp of the last write.
    pub updated_at: DateTime<Utc>,
}
