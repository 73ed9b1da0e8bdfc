//! In-process session store.
//!
//! Sessions are ephemeral server-side records binding an opaque token to
//! an authenticated account. They are never persisted; restarting the
//! process logs every operator out, which is acceptable for this system.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use pulse_core::{ClientId, SessionToken};
use pulse_store::Role;

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// An authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The opaque bearer token identifying this session.
    pub token: SessionToken,
    /// The stable id of the authenticated account.
    pub client_id: ClientId,
    /// Username of the authenticated account.
    pub username: String,
    /// Role of the authenticated account.
    pub role: Role,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// When the session stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the session has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe session store with lazy expiry.
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionToken, Session>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    /// Create a session store with the given time-to-live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: chrono::Duration::from_std(ttl)
                .unwrap_or_else(|_| chrono::Duration::seconds(1800)),
        }
    }

    /// Create a new session for an authenticated account.
    pub fn create(&self, client_id: ClientId, username: String, role: Role) -> Session {
        let now = Utc::now();
        let session = Session {
            token: SessionToken::generate(),
            client_id,
            username,
            role,
            created_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions
            .write()
            .insert(session.token, session.clone());
        session
    }

    /// Look up a session by token.
    ///
    /// Expired sessions are removed on lookup and reported as absent.
    pub fn get(&self, token: &SessionToken) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read();
            match sessions.get(token) {
                Some(s) if !s.is_expired(now) => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired: upgrade to a write lock and drop it.
        self.sessions.write().remove(token);
        None
    }

    /// Remove a session. Idempotent: removing an unknown or already-ended
    /// session is not an error.
    pub fn remove(&self, token: &SessionToken) {
        self.sessions.write().remove(token);
    }

    /// Number of live (non-expired) sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .read()
            .values()
            .filter(|s| !s.is_expired(now))
            .count()
    }

    /// Whether there are no live sessions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}
