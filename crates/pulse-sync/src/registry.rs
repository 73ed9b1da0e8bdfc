//! Identity registry: client record lifecycle and id minting.
//!
//! All uniqueness-sensitive flows (username duplicate checks, id minting)
//! run their existence check and the matching insert under one lock, so
//! two concurrent creations can never land on the same username or id.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use pulse_core::{mint_unique, ClientId};
use pulse_store::{ClientRecord, Role, Store};

use crate::error::{Result, SyncError};
use crate::types::SyncConfig;

/// Maximum accepted username length, in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// Durable storage and lookup of client records, plus unique id minting.
pub struct Registry<S: Store> {
    store: Arc<S>,
    /// Serializes create/mint/assign flows. Secret hashing happens before
    /// this lock is taken; only short store calls run under it.
    create_lock: Mutex<()>,
}

impl<S: Store> Registry<S> {
    /// Create a registry over the given store.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            create_lock: Mutex::new(()),
        }
    }

    /// Create a new client with a pre-hashed secret.
    ///
    /// The username must be unique (case-sensitive exact match); the id is
    /// minted here, collision-checked under the same lock as the insert.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidUsername` for malformed usernames and
    /// `SyncError::DuplicateUsername` when the name is taken.
    pub fn create_client(
        &self,
        username: &str,
        password_hash: String,
        role: Role,
    ) -> Result<ClientRecord> {
        validate_username(username)?;

        let _guard = self.create_lock.lock();

        if self.store.get_client(username)?.is_some() {
            return Err(SyncError::DuplicateUsername(username.to_string()));
        }

        let id = mint_unique(|candidate| {
            Ok::<bool, SyncError>(self.store.get_client_by_id(candidate)?.is_some())
        })?;

        let record = ClientRecord {
            id: Some(id),
            username: username.to_string(),
            password_hash,
            role,
            created_at: Utc::now(),
            seq: self.store.next_client_seq()?,
        };
        self.store.put_client(&record)?;

        tracing::info!(username = %record.username, role = ?role, "Created client");
        Ok(record)
    }

    /// Look up a client by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn find_by_username(&self, username: &str) -> Result<Option<ClientRecord>> {
        Ok(self.store.get_client(username)?)
    }

    /// Look up a client by its opaque id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn find_by_id(&self, client_id: &ClientId) -> Result<Option<ClientRecord>> {
        Ok(self.store.get_client_by_id(client_id)?)
    }

    /// Assign an id to a record that lacks one. Idempotent: a present id is
    /// never replaced, and repeated calls return the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn assign_id_if_missing(&self, record: &ClientRecord) -> Result<ClientRecord> {
        let _guard = self.create_lock.lock();

        // Re-read under the lock; a concurrent caller may have assigned it.
        let mut current = self
            .store
            .get_client(&record.username)?
            .unwrap_or_else(|| record.clone());
        if current.id.is_some() {
            return Ok(current);
        }

        let id = mint_unique(|candidate| {
            Ok::<bool, SyncError>(self.store.get_client_by_id(candidate)?.is_some())
        })?;
        current.id = Some(id);
        self.store.put_client(&current)?;
        tracing::info!(username = %current.username, "Assigned id to legacy record");
        Ok(current)
    }

    /// Delete a client by id.
    ///
    /// Admin records are never deletable; this is a rejected operation,
    /// not something merely hidden by a UI.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ClientNotFound` for unknown ids and
    /// `SyncError::ForbiddenAdminDelete` for admin targets.
    pub fn delete_client(&self, client_id: &ClientId) -> Result<()> {
        let record = self
            .store
            .get_client_by_id(client_id)?
            .ok_or_else(|| SyncError::ClientNotFound(client_id.clone()))?;

        if record.role.is_admin() {
            return Err(SyncError::ForbiddenAdminDelete);
        }

        self.store.delete_client(&record.username)?;
        tracing::info!(username = %record.username, client_id = %client_id, "Deleted client");
        Ok(())
    }

    /// List all clients in creation order. Snapshot at call time.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    pub fn list_clients(&self) -> Result<Vec<ClientRecord>> {
        Ok(self.store.list_clients()?)
    }

    /// Ensure the bootstrap admin account exists.
    ///
    /// One-time, idempotent step performed at service initialization, not
    /// on every request. Creates nothing when any admin record is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation or hashing fails.
    pub fn bootstrap(&self, config: &SyncConfig) -> Result<()> {
        let has_admin = self
            .list_clients()?
            .iter()
            .any(|c| c.role.is_admin());
        if has_admin {
            return Ok(());
        }

        let hash = pulse_auth::password::hash_password(&config.bootstrap_admin_password)?;
        self.create_client(&config.bootstrap_admin_username, hash, Role::Admin)?;
        tracing::warn!(
            username = %config.bootstrap_admin_username,
            "Bootstrapped admin account with initial secret; change it"
        );
        Ok(())
    }
}

/// Validate a human-chosen username.
fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(SyncError::InvalidUsername("username is empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(SyncError::InvalidUsername(format!(
            "username exceeds {MAX_USERNAME_LEN} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(SyncError::InvalidUsername(
            "username contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_auth::password::hash_password;
    use pulse_store::RocksStore;
    use tempfile::TempDir;

    fn setup() -> (Registry<RocksStore>, Arc<RocksStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        (Registry::new(Arc::clone(&store)), store, dir)
    }

    fn hash() -> String {
        hash_password("secret").unwrap()
    }

    #[test]
    fn create_and_find() {
        let (registry, _store, _dir) = setup();
        let record = registry
            .create_client("client01", hash(), Role::Client)
            .unwrap();

        let id = record.id().unwrap();
        assert_eq!(
            registry.find_by_id(id).unwrap().unwrap().username,
            "client01"
        );
        assert_eq!(
            registry
                .find_by_username("client01")
                .unwrap()
                .unwrap()
                .id(),
            Some(id)
        );
    }

    #[test]
    fn duplicate_username_rejected() {
        let (registry, _store, _dir) = setup();
        registry
            .create_client("client01", hash(), Role::Client)
            .unwrap();

        assert!(matches!(
            registry.create_client("client01", hash(), Role::Client),
            Err(SyncError::DuplicateUsername(_))
        ));
    }

    #[test]
    fn concurrent_creates_yield_one_success() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        let registry = Arc::new(Registry::new(store));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            handles.push(std::thread::spawn(move || {
                registry.create_client("client01", hash(), Role::Client)
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(SyncError::DuplicateUsername(_))))
            .count();
        assert_eq!(successes, 1);
        assert_eq!(duplicates, 3);
    }

    #[test]
    fn username_is_case_sensitive() {
        let (registry, _store, _dir) = setup();
        registry
            .create_client("client01", hash(), Role::Client)
            .unwrap();
        // Different case is a different username.
        registry
            .create_client("Client01", hash(), Role::Client)
            .unwrap();
    }

    #[test]
    fn invalid_usernames_rejected() {
        let (registry, _store, _dir) = setup();
        for bad in ["", "has space", "semi;colon", &"a".repeat(65)] {
            assert!(matches!(
                registry.create_client(bad, hash(), Role::Client),
                Err(SyncError::InvalidUsername(_))
            ));
        }
    }

    #[test]
    fn minted_ids_are_distinct() {
        let (registry, _store, _dir) = setup();
        let a = registry
            .create_client("client-a", hash(), Role::Client)
            .unwrap();
        let b = registry
            .create_client("client-b", hash(), Role::Client)
            .unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn assign_id_if_missing_is_idempotent() {
        let (registry, store, _dir) = setup();
        let record = ClientRecord {
            id: None,
            username: "legacy".to_string(),
            password_hash: hash(),
            role: Role::Client,
            created_at: Utc::now(),
            seq: store.next_client_seq().unwrap(),
        };
        store.put_client(&record).unwrap();

        let first = registry.assign_id_if_missing(&record).unwrap();
        let second = registry.assign_id_if_missing(&record).unwrap();
        assert!(first.id.is_some());
        assert_eq!(first.id, second.id);
    }

    #[test]
    fn assign_id_never_replaces_present_id() {
        let (registry, _store, _dir) = setup();
        let record = registry
            .create_client("client01", hash(), Role::Client)
            .unwrap();
        let id = record.id().unwrap().clone();

        let after = registry.assign_id_if_missing(&record).unwrap();
        assert_eq!(after.id(), Some(&id));
    }

    #[test]
    fn delete_admin_is_rejected() {
        let (registry, _store, _dir) = setup();
        let admin = registry.create_client("admin", hash(), Role::Admin).unwrap();

        assert!(matches!(
            registry.delete_client(admin.id().unwrap()),
            Err(SyncError::ForbiddenAdminDelete)
        ));
        // The record is still there.
        assert!(registry.find_by_username("admin").unwrap().is_some());
    }

    #[test]
    fn delete_unknown_is_not_found() {
        let (registry, _store, _dir) = setup();
        assert!(matches!(
            registry.delete_client(&ClientId::random()),
            Err(SyncError::ClientNotFound(_))
        ));
    }

    #[test]
    fn list_is_in_creation_order() {
        let (registry, _store, _dir) = setup();
        for name in ["zeta", "alpha", "mid"] {
            registry.create_client(name, hash(), Role::Client).unwrap();
        }
        let names: Vec<_> = registry
            .list_clients()
            .unwrap()
            .into_iter()
            .map(|c| c.username)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let (registry, _store, _dir) = setup();
        let config = SyncConfig::default();

        registry.bootstrap(&config).unwrap();
        registry.bootstrap(&config).unwrap();

        let admins: Vec<_> = registry
            .list_clients()
            .unwrap()
            .into_iter()
            .filter(|c| c.role.is_admin())
            .collect();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "admin");
        assert!(admins[0].id.is_some());
    }

    #[test]
    fn bootstrap_skips_when_admin_exists() {
        let (registry, _store, _dir) = setup();
        registry
            .create_client("superuser", hash(), Role::Admin)
            .unwrap();

        registry.bootstrap(&SyncConfig::default()).unwrap();
        assert!(registry.find_by_username("admin").unwrap().is_none());
    }
}
