//! Typed record access over the raw key-value store.

use intercompany_core::{LedgerError, RecordKind, Result};
use intercompany_store::{index_append, index_list, index_remove, KvStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;

fn read_failed(err: StoreError) -> LedgerError {
    LedgerError::Read(err.to_string())
}

fn write_failed(err: StoreError) -> LedgerError {
    LedgerError::Write(err.to_string())
}

/// Whether `key` holds a record. An empty value counts as absent.
pub(crate) fn exists<S: KvStore + ?Sized>(store: &S, key: &str) -> Result<bool> {
    Ok(store
        .get(key)
        .map_err(read_failed)?
        .is_some_and(|bytes| !bytes.is_empty()))
}

/// Load a record, or `None` if the key is empty.
///
/// A value that does not decode as `T` is reported as `NotFound`.
pub(crate) fn try_load<T, S>(store: &S, kind: RecordKind, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    let Some(bytes) = store.get(key).map_err(read_failed)? else {
        return Ok(None);
    };
    if bytes.is_empty() {
        return Ok(None);
    }

    serde_json::from_slice(&bytes).map(Some).map_err(|e| {
        tracing::warn!(%kind, key = %key, error = %e, "Stored record does not decode");
        LedgerError::NotFound {
            kind,
            key: key.to_string(),
        }
    })
}

/// Load a record that must exist.
pub(crate) fn load<T, S>(store: &S, kind: RecordKind, key: &str) -> Result<T>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    try_load(store, kind, key)?.ok_or_else(|| LedgerError::NotFound {
        kind,
        key: key.to_string(),
    })
}

/// Persist a record at `key`.
pub(crate) fn save<T, S>(store: &S, key: &str, record: &T) -> Result<()>
where
    T: Serialize,
    S: KvStore + ?Sized,
{
    let bytes = serde_json::to_vec(record)
        .map_err(|e| LedgerError::Write(format!("failed to encode record {key}: {e}")))?;
    store.put(key, &bytes).map_err(write_failed)
}

/// Remove the record at `key`.
pub(crate) fn remove<S: KvStore + ?Sized>(store: &S, kind: RecordKind, key: &str) -> Result<()> {
    store.delete(key).map_err(|e| match e {
        StoreError::NotFound { key } => LedgerError::NotFound { kind, key },
        other => write_failed(other),
    })
}

/// Append `key` to an index.
pub(crate) fn index_add<S: KvStore + ?Sized>(store: &S, index_key: &str, key: &str) -> Result<()> {
    index_append(store, index_key, key).map_err(write_failed)
}

/// Remove `key` from an index.
pub(crate) fn index_drop<S: KvStore + ?Sized>(store: &S, index_key: &str, key: &str) -> Result<()> {
    index_remove(store, index_key, key).map_err(write_failed)
}

/// Load every record listed in an index, in index order. Entries whose record
/// is missing or unreadable are skipped.
pub(crate) fn load_indexed<T, S>(store: &S, kind: RecordKind, index_key: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: KvStore + ?Sized,
{
    let keys = index_list(store, index_key).map_err(read_failed)?;
    let mut records = Vec::with_capacity(keys.len());
    for key in keys {
        match try_load(store, kind, &key) {
            Ok(Some(record)) => records.push(record),
            Ok(None) | Err(LedgerError::NotFound { .. }) => {
                tracing::warn!(%kind, key = %key, index = %index_key, "Index lists a missing record");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}
