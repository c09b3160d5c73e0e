//! Business-date sources.

use chrono::Utc;
use intercompany_core::LedgerDate;

/// Supplies the date that settlements and transfers are billed up to.
pub trait Clock: Send + Sync {
    /// The current business date.
    fn today(&self) -> LedgerDate;
}

/// The current UTC calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> LedgerDate {
        LedgerDate::from_naive(Utc::now().date_naive())
    }
}

/// A clock pinned to one date, for tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(LedgerDate);

impl FixedClock {
    /// Pin the clock to `today`.
    #[must_use]
    pub const fn new(today: LedgerDate) -> Self {
        Self(today)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> LedgerDate {
        self.0
    }
}
