//! License lifecycle and settlement engine.
//!
//! Every operation is a bounded, synchronous sequence of reads and writes
//! against a [`KvStore`](intercompany_store::KvStore). The engine holds no
//! locks and caches nothing: records and indexes are re-read on every access.
//! Atomicity across keys belongs to whoever supplies the store. The service
//! hands in a [`StagedTransaction`](intercompany_store::StagedTransaction) per
//! invocation so that a failed workflow leaves nothing behind.
//!
//! # Layout
//!
//! - [`Ledger`]: typed operations bound to one store and one business date
//!   - accounts: `create_account`, `add_activity`, `next_period`
//!   - licenses: `create_license`, `delete_license`
//!   - settlement: `settle_bill`, `transfer_license`
//! - [`Chaincode`]: the string-argument dispatcher in front of [`Ledger`]
//! - [`Clock`]: where "today" comes from
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use intercompany_chaincode::{Chaincode, FixedClock};
//! use intercompany_core::LedgerDate;
//! use intercompany_store::MemoryStore;
//!
//! let today = LedgerDate::from_ymd(2024, 1, 15).unwrap();
//! let chaincode = Chaincode::new(Arc::new(FixedClock::new(today)));
//! let store = MemoryStore::new();
//!
//! let args: Vec<String> = ["A", "B", "Alpha", "Beta", "USD", "Jan-2024", "1000", "0", "100", "Fees"]
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! chaincode.invoke(&store, "create_account", &args).unwrap();
//!
//! let record = chaincode
//!     .invoke(&store, "read", &["A_B_100".to_string()])
//!     .unwrap()
//!     .unwrap();
//! assert!(String::from_utf8(record).unwrap().contains("\"periodToDateBalance\":\"1000\""));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accounts;
pub mod clock;
pub mod dispatch;
pub mod licenses;
pub mod settlement;
mod state;

pub use accounts::CreateAccount;
pub use clock::{Clock, FixedClock, SystemClock};
pub use dispatch::{Chaincode, Function};
pub use licenses::CreateLicense;
pub use settlement::{Settlement, TransferLicense, TransferOutcome};

use intercompany_core::{Amount, LedgerDate, LedgerError, Result};
use intercompany_store::KvStore;

/// Ledger operations bound to one store and one business date.
pub struct Ledger<'a, S: KvStore + ?Sized> {
    store: &'a S,
    today: LedgerDate,
}

impl<'a, S: KvStore + ?Sized> Ledger<'a, S> {
    /// Bind the operations to `store`, treating `today` as the current date.
    pub fn new(store: &'a S, today: LedgerDate) -> Self {
        Self { store, today }
    }

    /// The business date operations run on.
    #[must_use]
    pub const fn today(&self) -> LedgerDate {
        self.today
    }
}

/// Reject a missing or blank argument.
fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Parse a required decimal argument.
fn parse_amount(field: &str, value: &str) -> Result<Amount> {
    require(field, value)?;
    value
        .parse()
        .map_err(|e| LedgerError::validation(format!("{field}: {e}")))
}
