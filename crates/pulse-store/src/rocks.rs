//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use pulse_core::{mint_unique, ClientId};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use crate::error::{Result, StoreError};
use crate::schema::{all_column_families, cf, meta};
use crate::types::{ClientRecord, CommandRecord};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes sequence-counter read-modify-write cycles.
    seq_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// Runs the one-time id backfill migration before returning, so every
    /// client record visible through the returned store carries an id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the migration
    /// fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self {
            db: Arc::new(db),
            seq_lock: Mutex::new(()),
        };
        store.backfill_client_ids()?;
        Ok(store)
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Whether an id is already present in the id index.
    fn id_taken(&self, client_id: &ClientId) -> Result<bool> {
        let cf_by_id = self.cf(cf::CLIENTS_BY_ID)?;
        Ok(self
            .db
            .get_cf(&cf_by_id, client_id.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some())
    }

    /// One-time migration: mint ids for legacy records created before the
    /// `client_id` field existed.
    ///
    /// Runs at open, before any request touches the store, so no
    /// per-request conditional is needed.
    fn backfill_client_ids(&self) -> Result<()> {
        let cf_clients = self.cf(cf::CLIENTS)?;

        let mut legacy: Vec<ClientRecord> = Vec::new();
        for item in self.db.iterator_cf(&cf_clients, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let record: ClientRecord = Self::deserialize(&value)?;
            if record.id.is_none() {
                legacy.push(record);
            }
        }

        if legacy.is_empty() {
            return Ok(());
        }

        tracing::info!(count = legacy.len(), "Backfilling client ids");
        for mut record in legacy {
            let id = mint_unique(|candidate| self.id_taken(candidate))?;
            record.id = Some(id);
            self.put_client(&record)?;
        }
        Ok(())
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Client Operations
    // =========================================================================

    fn put_client(&self, client: &ClientRecord) -> Result<()> {
        let cf_clients = self.cf(cf::CLIENTS)?;
        let cf_by_id = self.cf(cf::CLIENTS_BY_ID)?;

        let value = Self::serialize(client)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_clients, client.username.as_bytes(), &value);
        if let Some(id) = client.id() {
            batch.put_cf(&cf_by_id, id.as_bytes(), client.username.as_bytes());
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_client(&self, username: &str) -> Result<Option<ClientRecord>> {
        let cf_clients = self.cf(cf::CLIENTS)?;

        self.db
            .get_cf(&cf_clients, username.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn get_client_by_id(&self, client_id: &ClientId) -> Result<Option<ClientRecord>> {
        let cf_by_id = self.cf(cf::CLIENTS_BY_ID)?;

        let Some(username) = self
            .db
            .get_cf(&cf_by_id, client_id.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        let username = String::from_utf8(username)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.get_client(&username)
    }

    fn delete_client(&self, username: &str) -> Result<()> {
        let cf_clients = self.cf(cf::CLIENTS)?;
        let cf_by_id = self.cf(cf::CLIENTS_BY_ID)?;
        let cf_commands = self.cf(cf::COMMANDS)?;

        let client = self.get_client(username)?.ok_or(StoreError::NotFound)?;

        // The command record is a weak reference owned by the client; it
        // goes away in the same atomic batch.
        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_clients, username.as_bytes());
        if let Some(id) = client.id() {
            batch.delete_cf(&cf_by_id, id.as_bytes());
            batch.delete_cf(&cf_commands, id.as_bytes());
        }

        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn list_clients(&self) -> Result<Vec<ClientRecord>> {
        let cf_clients = self.cf(cf::CLIENTS)?;

        let mut clients = Vec::new();
        for item in self.db.iterator_cf(&cf_clients, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            clients.push(Self::deserialize::<ClientRecord>(&value)?);
        }

        // Usernames hash-order under RocksDB; the sequence number restores
        // insertion order.
        clients.sort_by_key(|c| c.seq);
        Ok(clients)
    }

    fn next_client_seq(&self) -> Result<u64> {
        let cf_meta = self.cf(cf::META)?;

        let _guard = self.seq_lock.lock();
        let next = self
            .db
            .get_cf(&cf_meta, meta::NEXT_CLIENT_SEQ)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| {
                let bytes: [u8; 8] = data
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Serialization("bad sequence counter".to_string()))?;
                Ok::<u64, StoreError>(u64::from_le_bytes(bytes))
            })
            .transpose()?
            .unwrap_or(0);

        self.db
            .put_cf(&cf_meta, meta::NEXT_CLIENT_SEQ, (next + 1).to_le_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(next)
    }

    // =========================================================================
    // Command Operations
    // =========================================================================

    fn put_command(&self, command: &CommandRecord) -> Result<()> {
        let cf_commands = self.cf(cf::COMMANDS)?;
        let value = Self::serialize(command)?;

        self.db
            .put_cf(&cf_commands, command.client_id.as_bytes(), value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_command(&self, client_id: &ClientId) -> Result<Option<CommandRecord>> {
        let cf_commands = self.cf(cf::COMMANDS)?;

        self.db
            .get_cf(&cf_commands, client_id.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn delete_command(&self, client_id: &ClientId) -> Result<()> {
        let cf_commands = self.cf(cf::COMMANDS)?;

        self.db
            .delete_cf(&cf_commands, client_id.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}
