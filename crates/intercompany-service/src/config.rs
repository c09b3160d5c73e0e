//! Service configuration.

use std::str::FromStr;

use intercompany_core::LedgerDate;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `STORE_BACKEND` names no known backend.
    #[error("unknown store backend {0:?}: expected \"rocksdb\" or \"memory\"")]
    UnknownBackend(String),

    /// `LEDGER_FIXED_DATE` is not an `MM-DD-YYYY` date.
    #[error("LEDGER_FIXED_DATE: {0}")]
    FixedDate(#[from] intercompany_core::CalendarError),
}

/// Where world state is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// A `RocksDB` database under `data_dir`.
    RocksDb,
    /// Process memory; state is lost on exit.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            "memory" | "mem" => Ok(Self::Memory),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/intercompany").
    pub data_dir: String,

    /// Storage backend (default: `rocksdb`).
    pub store_backend: StoreBackend,

    /// Service API key required on invoke requests (optional).
    pub service_api_key: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Business date to run on instead of the system date.
    pub fixed_date: Option<LedgerDate>,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `STORE_BACKEND` or `LEDGER_FIXED_DATE` is set to an
    /// unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let store_backend = match std::env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.store_backend,
        };

        let fixed_date = std::env::var("LEDGER_FIXED_DATE")
            .ok()
            .map(|value| value.parse::<LedgerDate>())
            .transpose()?;

        Ok(Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            store_backend,
            service_api_key: std::env::var("SERVICE_API_KEY").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_seconds),
            fixed_date,
        })
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/intercompany".into(),
            store_backend: StoreBackend::RocksDb,
            service_api_key: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024, // 1MB
            request_timeout_seconds: 30,
            fixed_date: None,
        }
    }
}
