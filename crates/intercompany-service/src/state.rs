//! Application state.

use std::sync::Arc;

use intercompany_chaincode::{Chaincode, FixedClock};
use intercompany_store::{BatchStore, MemoryStore};
use tokio::sync::Mutex;

use crate::config::{ServiceConfig, StoreBackend};

/// Application state shared across handlers.
pub struct AppState {
    /// World state.
    pub store: Arc<dyn BatchStore>,

    /// The ledger dispatcher.
    pub chaincode: Chaincode,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Held for the whole of each invocation; invocations never interleave.
    pub invoke_lock: Mutex<()>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The chaincode runs on `config.fixed_date` when one is set and on the
    /// system clock otherwise.
    #[must_use]
    pub fn new(store: Arc<dyn BatchStore>, config: ServiceConfig) -> Self {
        let chaincode = match config.fixed_date {
            Some(today) => {
                tracing::warn!(today = %today, "Ledger clock pinned to a fixed date");
                Chaincode::new(Arc::new(FixedClock::new(today)))
            }
            None => Chaincode::with_system_clock(),
        };

        Self::with_chaincode(store, chaincode, config)
    }

    /// Create application state around an existing dispatcher.
    #[must_use]
    pub fn with_chaincode(
        store: Arc<dyn BatchStore>,
        chaincode: Chaincode,
        config: ServiceConfig,
    ) -> Self {
        Self {
            store,
            chaincode,
            config,
            invoke_lock: Mutex::new(()),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("chaincode", &self.chaincode)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Open the configured storage backend.
///
/// # Errors
///
/// Returns an error if the `RocksDB` database cannot be opened, or if the
/// `rocksdb` backend is requested from a build without it.
pub fn open_store(config: &ServiceConfig) -> intercompany_store::Result<Arc<dyn BatchStore>> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store - state is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "rocksdb-backend")]
        StoreBackend::RocksDb => {
            tracing::info!(path = %config.data_dir, "Opening RocksDB store");
            Ok(Arc::new(intercompany_store::RocksStore::open(&config.data_dir)?))
        }
        #[cfg(not(feature = "rocksdb-backend"))]
        StoreBackend::RocksDb => Err(intercompany_store::StoreError::Database(
            "built without the rocksdb-backend feature".into(),
        )),
    }
}
