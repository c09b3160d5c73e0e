//! Write staging for one ledger invocation.
//!
//! A [`StagedTransaction`] sits in front of a [`BatchStore`]. Reads see the
//! invocation's own writes first, then the base store. Nothing reaches the base
//! store until [`StagedTransaction::commit`], which hands every buffered write
//! to [`BatchStore::apply`] as one batch. Dropping the transaction discards the
//! writes, so a failed invocation leaves no trace.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{Result, StoreError};
use crate::{BatchStore, KvStore, Mutation};

/// Pending value for a key: `Some` for a put, `None` for a delete.
type Overlay = BTreeMap<String, Option<Vec<u8>>>;

/// Buffered writes over a base store.
pub struct StagedTransaction<'a, S: BatchStore + ?Sized> {
    base: &'a S,
    overlay: Mutex<Overlay>,
}

impl<'a, S: BatchStore + ?Sized> StagedTransaction<'a, S> {
    /// Start staging writes against `base`.
    pub fn new(base: &'a S) -> Self {
        Self {
            base,
            overlay: Mutex::new(BTreeMap::new()),
        }
    }

    /// Number of keys with a pending write.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn pending(&self) -> Result<usize> {
        Ok(self.overlay()?.len())
    }

    /// Apply every staged write to the base store in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the base store rejects the batch.
    pub fn commit(self) -> Result<()> {
        let overlay = self
            .overlay
            .into_inner()
            .map_err(|_| StoreError::Database("staged transaction lock poisoned".into()))?;

        let mutations: Vec<Mutation> = overlay
            .into_iter()
            .map(|(key, value)| match value {
                Some(value) => Mutation::Put { key, value },
                None => Mutation::Delete { key },
            })
            .collect();

        tracing::debug!(writes = mutations.len(), "Committing staged writes");
        self.base.apply(mutations)
    }

    fn overlay(&self) -> Result<MutexGuard<'_, Overlay>> {
        self.overlay
            .lock()
            .map_err(|_| StoreError::Database("staged transaction lock poisoned".into()))
    }
}

impl<S: BatchStore + ?Sized> KvStore for StagedTransaction<'_, S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(pending) = self.overlay()?.get(key) {
            return Ok(pending.clone());
        }
        self.base.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        self.overlay()?
            .insert(key.to_string(), Some(value.to_vec()));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.get(key)?.is_none() {
            return Err(StoreError::NotFound { key: key.into() });
        }
        self.overlay()?.insert(key.to_string(), None);
        Ok(())
    }
}
