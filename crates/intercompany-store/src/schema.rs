//! Well-known keys and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Every record and index, keyed by its string key.
    pub const WORLD_STATE: &str = "world_state";
}

/// Keys of the enumeration indexes.
///
/// Each holds a JSON array of entity keys in insertion order.
pub mod index {
    /// Keys of every live account.
    pub const ACCOUNTS: &str = "_accountindex";

    /// Keys of every live license.
    pub const LICENSES: &str = "_licenseindex";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::WORLD_STATE]
}
