//! Billing periods and ledger dates.
//!
//! Two textual calendar forms appear in the ledger:
//!
//! - [`Period`]: an accounting period label such as `Jan-2024`
//! - [`LedgerDate`]: a day in the fixed `MM-DD-YYYY` form, e.g. `03-15-2024`

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Month abbreviations used in period labels, January first.
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// `chrono` format string for [`LedgerDate`].
const DATE_FORMAT: &str = "%m-%d-%Y";

/// Errors produced when parsing calendar text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// The text is not a `Mon-YYYY` period label.
    #[error("invalid period {0:?}: expected Mon-YYYY")]
    InvalidPeriod(String),

    /// The text is not an `MM-DD-YYYY` date.
    #[error("invalid date {0:?}: expected MM-DD-YYYY")]
    InvalidDate(String),

    /// The period is the last one a four-digit year can label.
    #[error("period {0} has no successor")]
    NoNextPeriod(String),
}

// ============================================================================
// Period
// ============================================================================

/// An accounting period: one calendar month of one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Period {
    year: i32,
    /// 1-based month.
    month: u32,
}

impl Period {
    /// Latest year a `Mon-YYYY` label can carry.
    pub const MAX_YEAR: i32 = 9999;

    /// Build a period from a year and a 1-based month.
    ///
    /// Returns `None` if `month` is outside `1..=12` or `year` outside
    /// `0..=9999`.
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (0..=Self::MAX_YEAR).contains(&year))
            .then_some(Self { year, month })
    }

    /// The year of this period.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The 1-based month of this period.
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// The period that follows this one. December rolls into January of the
    /// following year.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::NoNextPeriod` for `Dec-9999`.
    pub fn next(self) -> Result<Self, CalendarError> {
        if self.month < 12 {
            return Ok(Self {
                year: self.year,
                month: self.month + 1,
            });
        }
        if self.year >= Self::MAX_YEAR {
            return Err(CalendarError::NoNextPeriod(self.to_string()));
        }
        Ok(Self {
            year: self.year + 1,
            month: 1,
        })
    }
}

impl FromStr for Period {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidPeriod(s.to_string());

        let (name, year) = s.split_once('-').ok_or_else(invalid)?;
        let index = MONTH_NAMES
            .iter()
            .position(|m| *m == name)
            .ok_or_else(invalid)?;

        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;

        // index < 12, the cast cannot truncate
        #[allow(clippy::cast_possible_truncation)]
        let month = index as u32 + 1;
        Ok(Self { year, month })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = MONTH_NAMES[(self.month - 1) as usize];
        write!(f, "{name}-{:04}", self.year)
    }
}

impl TryFrom<String> for Period {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Period> for String {
    fn from(period: Period) -> Self {
        period.to_string()
    }
}

// ============================================================================
// LedgerDate
// ============================================================================

/// A calendar day in `MM-DD-YYYY` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LedgerDate(NaiveDate);

impl LedgerDate {
    /// Wrap a `chrono` date.
    #[must_use]
    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a date from its parts, or `None` if the day does not exist.
    #[must_use]
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Return the underlying `chrono` date.
    #[must_use]
    pub const fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Whole calendar months from `self` to `later`, ignoring the day of month.
    ///
    /// The result is negative when `later` falls in an earlier month.
    #[must_use]
    pub fn months_until(&self, later: &Self) -> i32 {
        // month() is 1..=12, the casts cannot wrap
        #[allow(clippy::cast_possible_wrap)]
        let months = later.0.month() as i32 - self.0.month() as i32;
        (later.0.year() - self.0.year()) * 12 + months
    }
}

impl FromStr for LedgerDate {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CalendarError::InvalidDate(s.to_string());

        // chrono accepts unpadded fields; the ledger form is fixed-width
        let bytes = s.as_bytes();
        if bytes.len() != 10 || bytes[2] != b'-' || bytes[5] != b'-' {
            return Err(invalid());
        }

        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }
}

impl fmt::Display for LedgerDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl TryFrom<String> for LedgerDate {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LedgerDate> for String {
    fn from(date: LedgerDate) -> Self {
        date.to_string()
    }
}

/// Month difference between two `MM-DD-YYYY` dates:
/// `(yearB - yearA) * 12 + (monthB - monthA)`.
///
/// Negative results are returned as-is.
///
/// # Errors
///
/// Returns `CalendarError::InvalidDate` if either argument is malformed.
pub fn month_diff(date_a: &str, date_b: &str) -> Result<i32, CalendarError> {
    let a: LedgerDate = date_a.parse()?;
    let b: LedgerDate = date_b.parse()?;
    Ok(a.months_until(&b))
}
