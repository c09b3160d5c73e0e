//! World-state storage for the intercompany ledger.
//!
//! The ledger sees storage as a flat key-value map with three primitives:
//! `get`, `put` and `delete`. Nothing here spans keys except
//! [`StagedTransaction`], which buffers the writes of one invocation and
//! applies them through [`BatchStore::apply`] in a single atomic batch.
//!
//! # Backends
//!
//! - [`MemoryStore`]: an in-process map, for tests and embedding
//! - `RocksStore`: a `RocksDB` database (feature `rocksdb-backend`)
//!
//! # Indexes
//!
//! The store has no query language, so enumeration goes through explicit
//! index records maintained by the [`index`] module.
//!
//! # Example
//!
//! ```
//! use intercompany_store::{KvStore, MemoryStore, StagedTransaction};
//!
//! let store = MemoryStore::new();
//! let tx = StagedTransaction::new(&store);
//! tx.put("greeting", b"hello").unwrap();
//! assert!(store.get("greeting").unwrap().is_none());
//!
//! tx.commit().unwrap();
//! assert_eq!(store.get("greeting").unwrap().as_deref(), Some(&b"hello"[..]));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod index;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;
pub mod staged;

pub use error::{Result, StoreError};
pub use index::{index_append, index_list, index_remove, index_reset};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;
pub use staged::StagedTransaction;

/// The key-value contract every ledger operation is written against.
///
/// No ordering or atomicity across distinct keys is promised.
pub trait KvStore: Send + Sync {
    /// Read the value at `key`, or `None` if the key holds nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write `value` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove the value at `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the key holds nothing.
    fn delete(&self, key: &str) -> Result<()>;
}

/// A single buffered write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Set `key` to `value`.
    Put {
        /// Target key.
        key: String,
        /// New value.
        value: Vec<u8>,
    },
    /// Remove `key`. Removing an absent key is not an error inside a batch.
    Delete {
        /// Target key.
        key: String,
    },
}

/// A store that can apply several writes as one atomic unit.
pub trait BatchStore: KvStore {
    /// Apply every mutation, or none of them.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails; no mutation is then
    /// visible.
    fn apply(&self, mutations: Vec<Mutation>) -> Result<()>;
}
