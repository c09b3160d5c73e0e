//! Intercompany ledger HTTP host.
//!
//! This crate plays the part of the transaction host for the chaincode:
//!
//! - one invocation at a time (a single async mutex)
//! - every invocation runs against its own staged transaction, committed in
//!   one atomic batch on success and discarded on failure
//! - read-only access to raw world state for inspection
//!
//! # Authentication
//!
//! When a service API key is configured, callers must send it in the
//! `x-api-key` header.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Axum handlers all return Result
#![allow(clippy::missing_errors_doc)]
// Health and world-state handlers are async for routing, not for awaiting
#![allow(clippy::unused_async)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
