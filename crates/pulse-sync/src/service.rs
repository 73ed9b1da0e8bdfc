//! Sync façade implementation.
//!
//! This module provides the `CommandSync` trait and `CommandSyncService`
//! implementation that compose the identity registry, the command state,
//! and access control into the externally visible operations.

use std::sync::Arc;

use async_trait::async_trait;
use pulse_auth::{AccessControl, AuthError, Session, SessionStore};
use pulse_core::{ClientId, SessionToken};
use pulse_store::{ClientRecord, CommandRecord, Role, Store};

use crate::commands;
use crate::error::{Result, SyncError};
use crate::registry::Registry;
use crate::types::{ClientOverview, Submitter, SyncConfig};

/// Trait defining the sync façade operations.
///
/// This is the complete transport-independent API of the system: the two
/// client-facing command operations plus the authenticated operator
/// surface.
#[async_trait]
pub trait CommandSync: Send + Sync {
    // =========================================================================
    // Command Operations
    // =========================================================================

    /// Read the latest command for a client.
    ///
    /// No authentication beyond possessing a valid `client_id`: the
    /// unguessable identifier is the bearer credential for this narrow
    /// read path.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::ClientNotFound` for unknown ids; `Ok(None)`
    /// when the client exists but has never been commanded.
    async fn poll_command(&self, client_id: &ClientId) -> Result<Option<CommandRecord>>;

    /// Replace the command for a client.
    ///
    /// Admin sessions may target any client; client sessions and bare
    /// bearer-id callers only their own id.
    ///
    /// # Errors
    ///
    /// Returns validation errors before any storage access, or
    /// `SyncError::ClientNotFound` / authorization errors.
    async fn submit_command(
        &self,
        submitter: &Submitter,
        client_id: &ClientId,
        value: &str,
    ) -> Result<CommandRecord>;

    // =========================================================================
    // Operator Session Operations
    // =========================================================================

    /// Verify credentials and issue a session.
    async fn login(&self, username: &str, secret: &str) -> Result<Session>;

    /// End a session. Idempotent.
    async fn logout(&self, token: &SessionToken) -> Result<()>;

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Create a new client account. Admin only.
    async fn create_client(
        &self,
        token: &SessionToken,
        username: &str,
        secret: &str,
    ) -> Result<ClientRecord>;

    /// Delete a client account by id. Admin only; admin targets rejected.
    async fn delete_client(&self, token: &SessionToken, client_id: &ClientId) -> Result<()>;

    /// List all accounts with their latest commands, in creation order.
    /// Admin only.
    async fn list_clients(&self, token: &SessionToken) -> Result<Vec<ClientOverview>>;
}

/// The main sync façade implementation.
pub struct CommandSyncService<S: Store> {
    store: Arc<S>,
    registry: Registry<S>,
    access: AccessControl<S>,
    config: SyncConfig,
}

impl<S: Store> CommandSyncService<S> {
    /// Create a sync service with a default session store.
    ///
    /// Runs the admin bootstrap step before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if bootstrap fails.
    pub fn new(store: Arc<S>, config: SyncConfig) -> Result<Self> {
        Self::with_sessions(store, config, SessionStore::default())
    }

    /// Create a sync service with a custom session store.
    ///
    /// # Errors
    ///
    /// Returns an error if bootstrap fails.
    pub fn with_sessions(
        store: Arc<S>,
        config: SyncConfig,
        sessions: SessionStore,
    ) -> Result<Self> {
        let registry = Registry::new(Arc::clone(&store));
        registry.bootstrap(&config)?;
        let access = AccessControl::new(Arc::clone(&store), sessions);
        Ok(Self {
            store,
            registry,
            access,
            config,
        })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Get the identity registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    /// Get the access controller.
    #[must_use]
    pub const fn access(&self) -> &AccessControl<S> {
        &self.access
    }

    /// A record's id, assigning one lazily for legacy rows.
    fn record_id(&self, record: &ClientRecord) -> Result<(ClientRecord, ClientId)> {
        if let Some(id) = record.id() {
            return Ok((record.clone(), id.clone()));
        }
        let updated = self.registry.assign_id_if_missing(record)?;
        let id = updated
            .id()
            .cloned()
            .ok_or_else(|| SyncError::Store(pulse_store::StoreError::NotFound))?;
        Ok((updated, id))
    }
}

#[async_trait]
impl<S: Store + 'static> CommandSync for CommandSyncService<S> {
    async fn poll_command(&self, client_id: &ClientId) -> Result<Option<CommandRecord>> {
        commands::get_command(&*self.store, client_id)
    }

    async fn submit_command(
        &self,
        submitter: &Submitter,
        client_id: &ClientId,
        value: &str,
    ) -> Result<CommandRecord> {
        match submitter {
            Submitter::Session(token) => {
                let session = self
                    .access
                    .session(token)
                    .ok_or(AuthError::Unauthenticated)?;
                // Admins command any client; everyone else only themselves.
                if !session.role.is_admin() && session.client_id != *client_id {
                    return Err(AuthError::Forbidden.into());
                }
            }
            // Possession of the unguessable id is the authorization here.
            Submitter::BearerId => {}
        }

        commands::set_command(&*self.store, client_id, value, self.config.max_command_len)
    }

    async fn login(&self, username: &str, secret: &str) -> Result<Session> {
        let record = self.access.verify_credentials(username, secret)?;
        // Legacy rows mint their id through the registry lock, the single
        // guard on id uniqueness.
        let (record, id) = self.record_id(&record)?;
        Ok(self.access.issue_session(id, record.username, record.role))
    }

    async fn logout(&self, token: &SessionToken) -> Result<()> {
        self.access.end_session(token);
        Ok(())
    }

    async fn create_client(
        &self,
        token: &SessionToken,
        username: &str,
        secret: &str,
    ) -> Result<ClientRecord> {
        self.access.require_role(token, Role::Admin)?;

        let hash = pulse_auth::password::hash_password(secret)?;
        self.registry.create_client(username, hash, Role::Client)
    }

    async fn delete_client(&self, token: &SessionToken, client_id: &ClientId) -> Result<()> {
        self.access.require_role(token, Role::Admin)?;
        self.registry.delete_client(client_id)
    }

    async fn list_clients(&self, token: &SessionToken) -> Result<Vec<ClientOverview>> {
        self.access.require_role(token, Role::Admin)?;

        let mut overviews = Vec::new();
        for record in self.registry.list_clients()? {
            let (record, id) = self.record_id(&record)?;
            let command = self.store.get_command(&id)?;
            overviews.push(ClientOverview::join(&record, command.as_ref(), id));
        }
        Ok(overviews)
    }
}
