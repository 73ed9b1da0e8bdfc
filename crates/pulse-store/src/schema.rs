//! Database schema definitions and column families.
//!
//! This module defines the column families used in `RocksDB` storage.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Primary client records, keyed by `username`.
    pub const CLIENTS: &str = "clients";

    /// Index: `client_id` to `username`.
    pub const CLIENTS_BY_ID: &str = "clients_by_id";

    /// Latest command per client, keyed by `client_id`.
    pub const COMMANDS: &str = "commands";

    /// Store metadata.
    pub const META: &str = "meta";
}

/// Keys within the `meta` column family.
pub mod meta {
    /// Next creation sequence number (u64, little-endian).
    pub const NEXT_CLIENT_SEQ: &[u8] = b"next_client_seq";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::CLIENTS, cf::CLIENTS_BY_ID, cf::COMMANDS, cf::META]
}
