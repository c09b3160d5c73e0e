//! Health endpoint integration tests.

mod common;

use axum::http::{HeaderName, HeaderValue};
use common::TestHarness;

#[tokio::test]
async fn health_check_returns_ok() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn health_check_returns_json() {
    let harness = TestHarness::new();

    let response = harness.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "intercompany-ledger");
}

#[tokio::test]
async fn health_check_needs_no_api_key() {
    let harness = TestHarness::new();

    harness.server.get("/health").await.assert_status_ok();
}

#[tokio::test]
async fn wildcard_origin_is_answered_with_any() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .get("/health")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("https://finance.example.com"),
        )
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("access-control-allow-origin"), "*");
}
