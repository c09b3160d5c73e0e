//! Error types for the intercompany ledger.

use std::fmt;

use crate::amount::{Amount, AmountError};
use crate::calendar::CalendarError;

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// The kind of record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// An intercompany account.
    Account,
    /// A license entitlement.
    License,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => f.write_str("account"),
            Self::License => f.write_str("license"),
        }
    }
}

/// Errors that can occur in ledger operations.
///
/// Every variant renders a distinct message naming the precondition that failed.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A missing, empty or malformed argument. Raised before any state access.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The referenced record does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// What kind of record was looked up.
        kind: RecordKind,
        /// The key that was looked up.
        key: String,
    },

    /// A create targeted a key that already holds a record.
    #[error("{kind} already exists: {key}")]
    AlreadyExists {
        /// What kind of record was being created.
        kind: RecordKind,
        /// The key that is already taken.
        key: String,
    },

    /// A transfer asked for more than the license holds.
    #[error("insufficient quantity on license {key}: held={held}, requested={requested}")]
    InsufficientQuantity {
        /// The source license key.
        key: String,
        /// Quantity currently held.
        held: Amount,
        /// Quantity requested for transfer.
        requested: Amount,
    },

    /// The state store failed on read.
    #[error("failed to read state: {0}")]
    Read(String),

    /// The state store failed on write or delete.
    #[error("failed to write state: {0}")]
    Write(String),
}

impl LedgerError {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error was raised before any state was touched.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<AmountError> for LedgerError {
    fn from(err: AmountError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<CalendarError> for LedgerError {
    fn from(err: CalendarError) -> Self {
        Self::Validation(err.to_string())
    }
}
