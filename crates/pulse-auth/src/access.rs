//! Access control: credential verification and authorization gating.

use std::sync::Arc;

use pulse_core::{ClientId, SessionToken};
use pulse_store::{ClientRecord, Role, Store};

use crate::error::{AuthError, Result};
use crate::password;
use crate::session::{Session, SessionStore};

/// Credential verification, session issuance, and role gating.
///
/// The façade composes these primitives into per-operation authorization
/// decisions; this type never decides *which* operation a caller may
/// perform, only who the caller is and what role they hold. Id minting
/// for legacy records also lives in the façade's registry, so there is a
/// single lock guarding id uniqueness.
pub struct AccessControl<S: Store> {
    store: Arc<S>,
    sessions: SessionStore,
}

impl<S: Store> AccessControl<S> {
    /// Create an access controller over the given store.
    #[must_use]
    pub fn new(store: Arc<S>, sessions: SessionStore) -> Self {
        Self { store, sessions }
    }

    /// Verify a username/secret pair and return the matching record.
    ///
    /// On success, hashes produced with outdated parameters are
    /// transparently regenerated and persisted (migration-on-login).
    /// No session is issued here; the caller issues one once it has a
    /// record that carries an id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for unknown usernames and
    /// wrong secrets alike.
    pub fn verify_credentials(&self, username: &str, secret: &str) -> Result<ClientRecord> {
        let mut record = self
            .store
            .get_client(username)?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(secret, &record.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        if password::needs_rehash(&record.password_hash) {
            record.password_hash = password::hash_password(secret)?;
            self.store.put_client(&record)?;
            tracing::info!(username = %record.username, "Rehashed credentials on login");
        }

        Ok(record)
    }

    /// Issue a session for a verified account.
    pub fn issue_session(&self, client_id: ClientId, username: String, role: Role) -> Session {
        let session = self.sessions.create(client_id, username, role);
        tracing::debug!(username = %session.username, role = ?session.role, "Issued session");
        session
    }

    /// Look up the live session for a token, if any.
    #[must_use]
    pub fn session(&self, token: &SessionToken) -> Option<Session> {
        self.sessions.get(token)
    }

    /// Require that the token names a live session with the given role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthenticated` when the token is missing,
    /// unknown, or expired; `AuthError::Forbidden` when the session exists
    /// but its role differs.
    pub fn require_role(&self, token: &SessionToken, role: Role) -> Result<Session> {
        let session = self
            .sessions
            .get(token)
            .ok_or(AuthError::Unauthenticated)?;
        if session.role != role {
            return Err(AuthError::Forbidden);
        }
        Ok(session)
    }

    /// End a session. Idempotent.
    pub fn end_session(&self, token: &SessionToken) {
        self.sessions.remove(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password;
    use crate::session::DEFAULT_SESSION_TTL;
    use pulse_store::RocksStore;
    use tempfile::TempDir;

    fn setup() -> (AccessControl<RocksStore>, Arc<RocksStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        let access = AccessControl::new(
            Arc::clone(&store),
            SessionStore::new(DEFAULT_SESSION_TTL),
        );
        (access, store, dir)
    }

    fn insert_client(store: &RocksStore, username: &str, secret: &str, role: Role) {
        let record = ClientRecord {
            id: Some(ClientId::random()),
            username: username.to_string(),
            password_hash: hash_password(secret).unwrap(),
            role,
            created_at: chrono::Utc::now(),
            seq: store.next_client_seq().unwrap(),
        };
        store.put_client(&record).unwrap();
    }

    fn login(access: &AccessControl<RocksStore>, username: &str, secret: &str) -> Result<Session> {
        let record = access.verify_credentials(username, secret)?;
        let id = record.id().unwrap().clone();
        Ok(access.issue_session(id, record.username, record.role))
    }

    #[test]
    fn verify_success() {
        let (access, store, _dir) = setup();
        insert_client(&store, "admin", "secret", Role::Admin);

        let record = access.verify_credentials("admin", "secret").unwrap();
        assert_eq!(record.username, "admin");
        assert_eq!(record.role, Role::Admin);
    }

    #[test]
    fn verify_wrong_secret() {
        let (access, store, _dir) = setup();
        insert_client(&store, "admin", "secret", Role::Admin);

        assert!(matches!(
            access.verify_credentials("admin", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn verify_unknown_username_same_error() {
        let (access, _store, _dir) = setup();
        assert!(matches!(
            access.verify_credentials("ghost", "whatever"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn verify_rehashes_outdated_hash() {
        let (access, store, _dir) = setup();

        // Store a record with a deliberately weak hash.
        use argon2::password_hash::{PasswordHasher, SaltString};
        let params = argon2::Params::new(1024, 1, 1, None).unwrap();
        let weak = argon2::Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        );
        let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
        let weak_hash = weak.hash_password(b"secret", &salt).unwrap().to_string();

        let record = ClientRecord {
            id: Some(ClientId::random()),
            username: "client01".to_string(),
            password_hash: weak_hash.clone(),
            role: Role::Client,
            created_at: chrono::Utc::now(),
            seq: store.next_client_seq().unwrap(),
        };
        store.put_client(&record).unwrap();

        access.verify_credentials("client01", "secret").unwrap();

        // The hash was replaced and the secret still verifies.
        let updated = store.get_client("client01").unwrap().unwrap();
        assert_ne!(updated.password_hash, weak_hash);
        assert!(crate::password::verify_password(
            "secret",
            &updated.password_hash
        ));
        assert!(!crate::password::needs_rehash(&updated.password_hash));
    }

    #[test]
    fn issue_session_is_live() {
        let (access, store, _dir) = setup();
        insert_client(&store, "admin", "secret", Role::Admin);

        let session = login(&access, "admin", "secret").unwrap();
        assert_eq!(access.session(&session.token).unwrap().username, "admin");
    }

    #[test]
    fn require_role_gates_by_role() {
        let (access, store, _dir) = setup();
        insert_client(&store, "client01", "secret", Role::Client);

        let session = login(&access, "client01", "secret").unwrap();

        assert!(access.require_role(&session.token, Role::Client).is_ok());
        assert!(matches!(
            access.require_role(&session.token, Role::Admin),
            Err(AuthError::Forbidden)
        ));
    }

    #[test]
    fn require_role_unknown_token_unauthenticated() {
        let (access, _store, _dir) = setup();
        assert!(matches!(
            access.require_role(&SessionToken::generate(), Role::Admin),
            Err(AuthError::Unauthenticated)
        ));
    }

    #[test]
    fn end_session_invalidates_and_is_idempotent() {
        let (access, store, _dir) = setup();
        insert_client(&store, "admin", "secret", Role::Admin);

        let session = login(&access, "admin", "secret").unwrap();
        access.end_session(&session.token);
        assert!(matches!(
            access.require_role(&session.token, Role::Admin),
            Err(AuthError::Unauthenticated)
        ));
        // Ending again is not an error.
        access.end_session(&session.token);
    }
}
