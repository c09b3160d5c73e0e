//! Common test utilities for intercompany service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::{Arc, RwLock};

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::{TestResponse, TestServer};
use serde_json::{json, Value};

use intercompany_chaincode::{Chaincode, FixedClock};
use intercompany_core::LedgerDate;
use intercompany_service::{create_router, AppState, ServiceConfig, StoreBackend};
use intercompany_store::{BatchStore, KvStore, MemoryStore, Mutation, StoreError};

/// A memory store whose reads of one chosen key can be made to fail.
#[derive(Debug, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    broken_key: RwLock<Option<String>>,
}

impl FlakyStore {
    /// Make every later read of `key` fail with a database error.
    pub fn break_reads_of(&self, key: &str) {
        *self.broken_key.write().unwrap() = Some(key.to_string());
    }

    /// Direct access to the committed state.
    pub fn committed(&self, key: &str) -> Option<Vec<u8>> {
        self.inner.get(key).unwrap()
    }
}

impl KvStore for FlakyStore {
    fn get(&self, key: &str) -> intercompany_store::Result<Option<Vec<u8>>> {
        if self.broken_key.read().unwrap().as_deref() == Some(key) {
            return Err(StoreError::Database(format!("read of {key} failed")));
        }
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> intercompany_store::Result<()> {
        self.inner.put(key, value)
    }

    fn delete(&self, key: &str) -> intercompany_store::Result<()> {
        self.inner.delete(key)
    }
}

impl BatchStore for FlakyStore {
    fn apply(&self, mutations: Vec<Mutation>) -> intercompany_store::Result<()> {
        self.inner.apply(mutations)
    }
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The world state behind the server.
    pub store: Arc<dyn BatchStore>,
    /// The service API key for invoke requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// A fresh in-memory ledger whose clock reads 06-01-2024.
    pub fn new() -> Self {
        Self::on_date(LedgerDate::from_ymd(2024, 6, 1).expect("valid date"))
    }

    /// A fresh in-memory ledger whose clock reads `today`.
    pub fn on_date(today: LedgerDate) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), today)
    }

    /// A ledger over an existing store.
    pub fn with_store(store: Arc<dyn BatchStore>, today: LedgerDate) -> Self {
        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: String::new(),
            store_backend: StoreBackend::Memory,
            service_api_key: Some(service_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            fixed_date: Some(today),
        };

        let chaincode = Chaincode::new(Arc::new(FixedClock::new(today)));
        let state = AppState::with_chaincode(Arc::clone(&store), chaincode, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            service_api_key,
        }
    }

    /// The `x-api-key` header for service requests.
    pub fn api_key_header(&self) -> (HeaderName, HeaderValue) {
        (
            HeaderName::from_static("x-api-key"),
            HeaderValue::from_str(&self.service_api_key).expect("valid header value"),
        )
    }

    /// Invoke a function with the service key.
    pub async fn invoke(&self, function: &str, args: &[&str]) -> TestResponse {
        let (name, value) = self.api_key_header();
        self.server
            .post("/v1/invoke")
            .add_header(name, value)
            .json(&json!({ "function": function, "args": args }))
            .await
    }

    /// Fetch a record through `/v1/state/:key` and parse it.
    pub async fn record(&self, key: &str) -> Value {
        let (name, value) = self.api_key_header();
        let response = self
            .server
            .get(&format!("/v1/state/{key}"))
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Seed the four accounts and the `P1_E1` license used by transfer tests.
    pub async fn seed_transfer_fixture(&self) {
        for (to, from, no, name) in [
            ("SRC", "LIC", "1", "Source license"),
            ("TGT", "LIC", "1", "Target license"),
            ("SRC", "SUP", "1", "Source support"),
            ("TGT", "SUP", "1", "Target support"),
        ] {
            self.invoke(
                "create_account",
                &[to, from, to, from, "USD", "Jan-2024", "0", "0", no, name],
            )
            .await
            .assert_status_ok();
        }

        self.invoke(
            "create_license",
            &[
                "P1",
                "E1",
                "10",
                "120",
                "12",
                "01-01-2024",
                "12-31-2028",
                "01-01-2024",
                "12-31-2028",
                "USD",
                "01-01-2024",
            ],
        )
        .await
        .assert_status_ok();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
