//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `KvStore` and
//! `BatchStore` traits.

use std::path::Path;
use std::sync::Arc;

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, MultiThreaded, Options,
    WriteBatch,
};

use crate::error::{Result, StoreError};
use crate::schema::{all_column_families, cf};
use crate::{BatchStore, KvStore, Mutation};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
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

        Ok(Self { db: Arc::new(db) })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }
}

impl KvStore for RocksStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf(cf::WORLD_STATE)?;

        self.db
            .get_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let cf = self.cf(cf::WORLD_STATE)?;

        self.db
            .put_cf(&cf, key.as_bytes(), value)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let cf = self.cf(cf::WORLD_STATE)?;

        // RocksDB deletes are blind; report absent keys like the other backends
        if self.get(key)?.is_none() {
            return Err(StoreError::NotFound { key: key.into() });
        }

        self.db
            .delete_cf(&cf, key.as_bytes())
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}

impl BatchStore for RocksStore {
    fn apply(&self, mutations: Vec<Mutation>) -> Result<()> {
        let cf = self.cf(cf::WORLD_STATE)?;

        let mut batch = WriteBatch::default();
        for mutation in &mutations {
            match mutation {
                Mutation::Put { key, value } => batch.put_cf(&cf, key.as_bytes(), value),
                Mutation::Delete { key } => batch.delete_cf(&cf, key.as_bytes()),
            }
        }

        // Write atomically
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }
}
