//! Decimal amounts with a lossless textual form.
//!
//! Balances, prices, fees and quantities are binary `f64` values. They travel as
//! strings: arguments arrive as text and records persist amounts as text. The
//! text written is always the shortest decimal that parses back to the same
//! `f64`, so repeated read-modify-write cycles never drift.

use std::fmt;
use std::ops::Neg;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors produced when parsing or constructing an [`Amount`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    /// The text is not a decimal number.
    #[error("not a numeric string: {0:?}")]
    NotNumeric(String),

    /// The value is NaN or infinite.
    #[error("amount is not finite: {0}")]
    NotFinite(String),
}

/// A finite decimal amount.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(f64);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0.0);

    /// Wrap a raw value, rejecting NaN and infinities.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::NotFinite` if `value` is not finite.
    pub fn new(value: f64) -> Result<Self, AmountError> {
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(AmountError::NotFinite(value.to_string()))
        }
    }

    /// Return the underlying value.
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }

    /// Whether the amount is strictly less than zero.
    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0 < 0.0
    }

    /// `self + rhs`, or an error if the sum overflows to infinity.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::NotFinite` if the sum is not finite.
    pub fn checked_add(self, rhs: Self) -> Result<Self, AmountError> {
        Self::new(self.0 + rhs.0)
    }

    /// `self - rhs`, or an error if the difference overflows to infinity.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::NotFinite` if the difference is not finite.
    pub fn checked_sub(self, rhs: Self) -> Result<Self, AmountError> {
        Self::new(self.0 - rhs.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .parse()
            .map_err(|_| AmountError::NotNumeric(s.to_string()))?;
        if value.is_finite() {
            Ok(Self(value))
        } else {
            Err(AmountError::NotFinite(s.to_string()))
        }
    }
}

impl fmt::Display for Amount {
    #[allow(clippy::float_cmp)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `-0` would still round-trip, but reads badly in a ledger.
        if self.0 == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({self})")
    }
}

impl TryFrom<String> for Amount {
    type Error = AmountError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_string()
    }
}

impl Neg for Amount {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers_and_fractions() {
        assert_eq!("1000".parse::<Amount>().unwrap().value(), 1000.0);
        assert_eq!("-12.5".parse::<Amount>().unwrap().value(), -12.5);
        assert_eq!("1.5E+03".parse::<Amount>().unwrap().value(), 1500.0);
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(matches!(
            "abc".parse::<Amount>(),
            Err(AmountError::NotNumeric(_))
        ));
        assert!(matches!("".parse::<Amount>(), Err(AmountError::NotNumeric(_))));
        assert!(matches!(
            "NaN".parse::<Amount>(),
            Err(AmountError::NotFinite(_))
        ));
        assert!(matches!(
            "inf".parse::<Amount>(),
            Err(AmountError::NotFinite(_))
        ));
    }

    #[test]
    fn formats_shortest_text() {
        assert_eq!(Amount(1250.0).to_string(), "1250");
        assert_eq!(Amount(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Amount(-0.0).to_string(), "0");
    }

    #[test]
    fn text_reparses_to_identical_value() {
        for value in [0.1, 1.0 / 3.0, 123_456.789, -98.76e-5, 1e21] {
            let text = Amount(value).to_string();
            assert_eq!(text.parse::<Amount>().unwrap().value().to_bits(), value.to_bits());
        }
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Amount(250.0)).unwrap();
        assert_eq!(json, "\"250\"");

        let parsed: Amount = serde_json::from_str("\"42.5\"").unwrap();
        assert_eq!(parsed.value(), 42.5);

        assert!(serde_json::from_str::<Amount>("\"twelve\"").is_err());
    }

    #[test]
    fn checked_arithmetic_refuses_overflow() {
        let huge = Amount::new(1e308).unwrap();
        assert!(matches!(
            huge.checked_add(huge),
            Err(AmountError::NotFinite(_))
        ));
        assert!(matches!(
            (-huge).checked_sub(huge),
            Err(AmountError::NotFinite(_))
        ));

        let sum = Amount(250.0).checked_add(Amount(-40.5)).unwrap();
        assert_eq!(sum.value(), 209.5);
        assert_eq!(Amount(10.0).checked_sub(Amount(4.0)).unwrap().value(), 6.0);
    }

    #[test]
    fn new_rejects_non_finite() {
        assert!(Amount::new(f64::NAN).is_err());
        assert!(Amount::new(f64::INFINITY).is_err());
        assert_eq!(Amount::new(3.0).unwrap().value(), 3.0);
    }
}
