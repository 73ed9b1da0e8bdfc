//! `RocksDB` storage layer for pulse.
//!
//! This crate provides persistent storage for client records and their
//! latest commands using `RocksDB` with column families.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `clients`: Primary client records, keyed by `username`
//! - `clients_by_id`: Index mapping `client_id` to `username`
//! - `commands`: Latest command per client, keyed by `client_id`
//! - `meta`: Store metadata (creation-sequence counter)
//!
//! Usernames key the primary records because they are the immutable
//! authentication identity; the opaque `client_id` used on the polling
//! path resolves through the index. A one-time migration at open mints
//! ids for legacy records that predate the `client_id` field.
//!
//! # Example
//!
//! ```no_run
//! use pulse_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/pulse-db").unwrap();
//! let clients = store.list_clients().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod rocks;
pub mod schema;
pub mod types;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;
pub use types::{ClientRecord, CommandRecord, Role};

use pulse_core::ClientId;

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations. All mutation goes through these operations; callers
/// never touch records in place. Uniqueness-sensitive flows (client
/// creation, id minting) are serialized by the registry, which performs
/// its existence checks and the matching insert under one lock.
pub trait Store: Send + Sync {
    // =========================================================================
    // Client Operations
    // =========================================================================

    /// Insert or update a client record.
    ///
    /// Also maintains the `client_id` index when the record carries an id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_client(&self, client: &ClientRecord) -> Result<()>;

    /// Get a client by username (case-sensitive exact match).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_client(&self, username: &str) -> Result<Option<ClientRecord>>;

    /// Get a client by its opaque id, via the id index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_client_by_id(&self, client_id: &ClientId) -> Result<Option<ClientRecord>>;

    /// Delete a client by username.
    ///
    /// Removes the record, its id index entry, and its command record in a
    /// single atomic batch. Role checks (admin records are not deletable)
    /// belong to the registry, not the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the client doesn't exist.
    fn delete_client(&self, username: &str) -> Result<()>;

    /// List all client records, ordered by creation sequence.
    ///
    /// The result is a snapshot taken at call time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_clients(&self) -> Result<Vec<ClientRecord>>;

    /// Allocate the next creation sequence number.
    ///
    /// Monotonically increasing across the lifetime of the store; used to
    /// keep `list_clients` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn next_client_seq(&self) -> Result<u64>;

    // =========================================================================
    // Command Operations
    // =========================================================================

    /// Insert or replace the command record for a client.
    ///
    /// A single `RocksDB` point write, so the replace is atomic per key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_command(&self, command: &CommandRecord) -> Result<()>;

    /// Get the latest command for a client.
    ///
    /// Returns `None` when the client has never been commanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_command(&self, client_id: &ClientId) -> Result<Option<CommandRecord>>;

    /// Remove the command record for a client, if any. Idempotent.
    ///
    /// Used when a command write loses a race against client deletion and
    /// must be rolled back; normal deletion removes the command inside
    /// `delete_client`'s batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn delete_command(&self, client_id: &ClientId) -> Result<()>;
}
