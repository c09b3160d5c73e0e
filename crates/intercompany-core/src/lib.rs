//! Core types for the intercompany ledger.
//!
//! This crate provides the records and value types every other crate in the
//! workspace shares:
//!
//! - **Records**: `Account`, `License`
//! - **Values**: `Amount`, `Period`, `LedgerDate`
//! - **Errors**: `LedgerError`, `RecordKind`
//!
//! # Persisted form
//!
//! Records are stored as flat JSON objects with camelCase field names. Every
//! monetary or quantity field is a JSON string holding the shortest decimal text
//! that parses back to the identical `f64`, so a record can be read, changed and
//! written again without drifting.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod amount;
pub mod calendar;
pub mod error;
pub mod license;

pub use account::Account;
pub use amount::{Amount, AmountError};
pub use calendar::{month_diff, CalendarError, LedgerDate, Period};
pub use error::{LedgerError, RecordKind, Result};
pub use license::{License, LICENSE_AMORTIZATION_MONTHS, SUPPORT_BILLING_MONTHS};
