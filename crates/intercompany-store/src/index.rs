//! Enumeration indexes.
//!
//! An index is a JSON array of entity keys stored under a well-known key (see
//! [`crate::schema::index`]). It preserves insertion order and holds no
//! duplicates. Every call re-reads the index from the store; nothing is cached.
//!
//! Owners call [`index_append`] as the closing step of a create and
//! [`index_remove`] as the closing step of a delete.

use crate::error::{Result, StoreError};
use crate::KvStore;

/// Read the keys held by an index. A missing or empty record reads as an empty
/// index.
///
/// # Errors
///
/// Returns an error if the store fails or the record is not a JSON string array.
pub fn index_list<S: KvStore + ?Sized>(store: &S, index_key: &str) -> Result<Vec<String>> {
    match store.get(index_key)? {
        Some(bytes) if !bytes.is_empty() => serde_json::from_slice(&bytes).map_err(|e| {
            StoreError::Serialization(format!("index {index_key} is unreadable: {e}"))
        }),
        _ => Ok(Vec::new()),
    }
}

/// Append `entity_key` to an index unless it is already present.
///
/// # Errors
///
/// Returns an error if the index cannot be read or written.
pub fn index_append<S: KvStore + ?Sized>(store: &S, index_key: &str, entity_key: &str) -> Result<()> {
    let mut keys = index_list(store, index_key)?;
    if keys.iter().any(|k| k == entity_key) {
        return Ok(());
    }
    keys.push(entity_key.to_string());
    write_index(store, index_key, &keys)?;

    tracing::debug!(index = %index_key, key = %entity_key, size = keys.len(), "Index entry appended");
    Ok(())
}

/// Remove the first occurrence of `entity_key` from an index. Removing an
/// absent key is a no-op.
///
/// # Errors
///
/// Returns an error if the index cannot be read or written.
pub fn index_remove<S: KvStore + ?Sized>(store: &S, index_key: &str, entity_key: &str) -> Result<()> {
    let mut keys = index_list(store, index_key)?;
    if let Some(position) = keys.iter().position(|k| k == entity_key) {
        keys.remove(position);
        tracing::debug!(index = %index_key, key = %entity_key, size = keys.len(), "Index entry removed");
    }
    write_index(store, index_key, &keys)
}

/// Replace an index with an empty one.
///
/// # Errors
///
/// Returns an error if the index cannot be written.
pub fn index_reset<S: KvStore + ?Sized>(store: &S, index_key: &str) -> Result<()> {
    write_index(store, index_key, &[])
}

fn write_index<S: KvStore + ?Sized>(store: &S, index_key: &str, keys: &[String]) -> Result<()> {
    let bytes = serde_json::to_vec(keys).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.put(index_key, &bytes)
}
