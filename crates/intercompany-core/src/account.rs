//! Intercompany account records.
//!
//! An account is one ledger line between a "due-to" and a "due-from" legal
//! entity for one currency and accounting period. Its running balance always
//! equals the opening balance plus the activity posted in the current period.

use serde::{Deserialize, Serialize};

use crate::{Amount, Period, Result};

/// An intercompany account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Storage key, see [`Account::key`].
    pub account_key: String,

    /// Entity the balance is due to.
    pub due_to_entity_code: String,

    /// Entity the balance is due from.
    pub due_from_entity_code: String,

    /// Display name of the due-to entity.
    pub due_to_entity_name: String,

    /// Display name of the due-from entity.
    pub due_from_entity_name: String,

    /// Currency code.
    pub currency: String,

    /// Current accounting period.
    pub period: Period,

    /// Balance carried in at the start of the period.
    pub opening_balance: Amount,

    /// Net movement posted within the period.
    pub activity: Amount,

    /// Running balance: `opening_balance + activity`.
    pub period_to_date_balance: Amount,

    /// Account number within the entity pair.
    pub account_no: String,

    /// Account display name.
    pub account_name: String,
}

impl Account {
    /// Derive the storage key for an account.
    #[must_use]
    pub fn key(due_to_entity_code: &str, due_from_entity_code: &str, account_no: &str) -> String {
        format!("{due_to_entity_code}_{due_from_entity_code}_{account_no}")
    }

    /// Open a new account. The period-to-date balance is derived.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the opening balance plus the
    /// activity is not a finite amount.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        due_to_entity_code: String,
        due_from_entity_code: String,
        due_to_entity_name: String,
        due_from_entity_name: String,
        currency: String,
        period: Period,
        opening_balance: Amount,
        activity: Amount,
        account_no: String,
        account_name: String,
    ) -> Result<Self> {
        let period_to_date_balance = opening_balance.checked_add(activity)?;
        Ok(Self {
            account_key: Self::key(&due_to_entity_code, &due_from_entity_code, &account_no),
            due_to_entity_code,
            due_from_entity_code,
            due_to_entity_name,
            due_from_entity_name,
            currency,
            period,
            opening_balance,
            activity,
            period_to_date_balance,
            account_no,
            account_name,
        })
    }

    /// Post an amount to the current period. On error the account is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the activity or the balance would
    /// overflow.
    pub fn post_activity(&mut self, amount: Amount) -> Result<()> {
        let activity = self.activity.checked_add(amount)?;
        let balance = self.period_to_date_balance.checked_add(amount)?;
        self.activity = activity;
        self.period_to_date_balance = balance;
        Ok(())
    }

    /// Close the current period and open the next one, carrying the running
    /// balance forward as the new opening balance. On error the account is
    /// left unchanged.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the period is `Dec-9999`.
    pub fn roll_period(&mut self) -> Result<()> {
        self.period = self.period.next()?;
        self.opening_balance = self.period_to_date_balance;
        self.activity = Amount::ZERO;
        Ok(())
    }
}
