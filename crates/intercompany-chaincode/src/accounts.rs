//! Account ledger: creation, activity posting and period rollover.

use intercompany_core::{Account, Amount, LedgerError, Period, RecordKind, Result};
use intercompany_store::schema::index;
use intercompany_store::KvStore;

use crate::{parse_amount, require, state, Ledger};

/// Arguments of `create_account`, as received.
#[derive(Debug, Clone, Default)]
pub struct CreateAccount {
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
    /// Period label, `Mon-YYYY`.
    pub period: String,
    /// Opening balance, decimal text.
    pub opening_balance: String,
    /// Activity already posted, decimal text.
    pub activity: String,
    /// Account number.
    pub account_no: String,
    /// Account display name.
    pub account_name: String,
}

impl CreateAccount {
    /// Check every field and build the account record.
    fn validate(&self) -> Result<Account> {
        let fields = [
            ("dueToEntityCode", &self.due_to_entity_code),
            ("dueFromEntityCode", &self.due_from_entity_code),
            ("dueToEntityName", &self.due_to_entity_name),
            ("dueFromEntityName", &self.due_from_entity_name),
            ("currency", &self.currency),
            ("period", &self.period),
            ("openingBalance", &self.opening_balance),
            ("activity", &self.activity),
            ("accountNo", &self.account_no),
            ("accountName", &self.account_name),
        ];
        for (field, value) in fields {
            require(field, value)?;
        }

        let opening_balance = parse_amount("openingBalance", &self.opening_balance)?;
        let activity = parse_amount("activity", &self.activity)?;
        let period: Period = self.period.parse()?;

        Account::new(
            self.due_to_entity_code.clone(),
            self.due_from_entity_code.clone(),
            self.due_to_entity_name.clone(),
            self.due_from_entity_name.clone(),
            self.currency.clone(),
            period,
            opening_balance,
            activity,
            self.account_no.clone(),
            self.account_name.clone(),
        )
    }
}

impl<S: KvStore + ?Sized> Ledger<'_, S> {
    /// Open a new account and add it to the account index.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a blank field, a non-numeric amount or a
    ///   malformed period; nothing is read or written.
    /// - `LedgerError::AlreadyExists` if the derived key holds a record.
    pub fn create_account(&self, request: &CreateAccount) -> Result<Account> {
        let account = request.validate()?;

        if state::exists(self.store, &account.account_key)? {
            return Err(LedgerError::AlreadyExists {
                kind: RecordKind::Account,
                key: account.account_key,
            });
        }

        state::save(self.store, &account.account_key, &account)?;
        state::index_add(self.store, index::ACCOUNTS, &account.account_key)?;

        tracing::info!(
            account_key = %account.account_key,
            period = %account.period,
            balance = %account.period_to_date_balance,
            "Account created"
        );
        Ok(account)
    }

    /// Load an account.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the key is empty or undecodable.
    pub fn get_account(&self, account_key: &str) -> Result<Account> {
        require("accountKey", account_key)?;
        state::load(self.store, RecordKind::Account, account_key)
    }

    /// Every account in the account index, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be read.
    pub fn list_accounts(&self) -> Result<Vec<Account>> {
        state::load_indexed(self.store, RecordKind::Account, index::ACCOUNTS)
    }

    /// Post a decimal amount, given as text, to an account's current period.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` if `amount` is not a decimal number, or if
    ///   posting it would overflow the activity or the balance. Nothing is
    ///   written in that case.
    /// - `LedgerError::NotFound` if the account is missing or undecodable.
    pub fn add_activity(&self, account_key: &str, amount: &str) -> Result<Account> {
        require("accountKey", account_key)?;
        let amount = parse_amount("amount", amount)?;
        self.post_activity(account_key, amount)
    }

    fn post_activity(&self, account_key: &str, amount: Amount) -> Result<Account> {
        let mut account: Account = state::load(self.store, RecordKind::Account, account_key)?;
        account.post_activity(amount)?;
        state::save(self.store, account_key, &account)?;

        tracing::debug!(
            account_key = %account_key,
            amount = %amount,
            balance = %account.period_to_date_balance,
            "Activity posted"
        );
        Ok(account)
    }

    /// Roll an account into the next accounting period.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound` if the account is missing or undecodable.
    /// - `LedgerError::Validation` if the account is already in `Dec-9999`.
    pub fn next_period(&self, account_key: &str) -> Result<Account> {
        let mut account = self.get_account(account_key)?;
        let closed = account.period;
        account.roll_period()?;
        state::save(self.store, account_key, &account)?;

        tracing::info!(
            account_key = %account_key,
            closed = %closed,
            opened = %account.period,
            opening_balance = %account.opening_balance,
            "Account rolled into next period"
        );
        Ok(account)
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use intercompany_core::LedgerDate;
    use intercompany_store::{index_list, MemoryStore};

    fn today() -> LedgerDate {
        LedgerDate::from_ymd(2024, 1, 15).unwrap()
    }

    fn alpha_beta() -> CreateAccount {
        CreateAccount {
            due_to_entity_code: "A".into(),
            due_from_entity_code: "B".into(),
            due_to_entity_name: "Alpha".into(),
            due_from_entity_name: "Beta".into(),
            currency: "USD".into(),
            period: "Jan-2024".into(),
            opening_balance: "1000".into(),
            activity: "0".into(),
            account_no: "100".into(),
            account_name: "License fees".into(),
        }
    }

    #[test]
    fn create_add_roll_scenario() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());

        let account = ledger.create_account(&alpha_beta()).unwrap();
        assert_eq!(account.account_key, "A_B_100");
        assert_eq!(account.period_to_date_balance.value(), 1000.0);

        let account = ledger.add_activity("A_B_100", "250").unwrap();
        assert_eq!(account.activity.value(), 250.0);
        assert_eq!(account.period_to_date_balance.value(), 1250.0);

        let account = ledger.next_period("A_B_100").unwrap();
        assert_eq!(account.opening_balance.value(), 1250.0);
        assert_eq!(account.activity, Amount::ZERO);
        assert_eq!(account.period.to_string(), "Feb-2024");

        let stored = ledger.get_account("A_B_100").unwrap();
        assert_eq!(stored, account);
    }

    #[test]
    fn balance_tracks_opening_plus_activity() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());
        let mut request = alpha_beta();
        request.activity = "12.5".into();
        ledger.create_account(&request).unwrap();

        for amount in ["0.1", "0.2", "-300", "1e3", "-0.3"] {
            let account = ledger.add_activity("A_B_100", amount).unwrap();
            let expected = account.opening_balance.value() + account.activity.value();
            assert!((account.period_to_date_balance.value() - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn create_appends_to_account_index() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());
        ledger.create_account(&alpha_beta()).unwrap();

        let mut second = alpha_beta();
        second.account_no = "200".into();
        ledger.create_account(&second).unwrap();

        assert_eq!(
            index_list(&store, index::ACCOUNTS).unwrap(),
            vec!["A_B_100", "A_B_200"]
        );
        let listed: Vec<_> = ledger
            .list_accounts()
            .unwrap()
            .into_iter()
            .map(|a| a.account_key)
            .collect();
        assert_eq!(listed, vec!["A_B_100", "A_B_200"]);
    }

    #[test]
    fn duplicate_account_is_rejected() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());
        ledger.create_account(&alpha_beta()).unwrap();

        let result = ledger.create_account(&alpha_beta());
        assert!(matches!(
            result,
            Err(LedgerError::AlreadyExists { kind: RecordKind::Account, ref key }) if key == "A_B_100"
        ));
        assert_eq!(index_list(&store, index::ACCOUNTS).unwrap().len(), 1);
    }

    #[test]
    fn invalid_arguments_touch_nothing() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());

        let mut blank = alpha_beta();
        blank.account_name = "  ".into();
        let mut not_numeric = alpha_beta();
        not_numeric.opening_balance = "lots".into();
        let mut bad_period = alpha_beta();
        bad_period.period = "2024-01".into();

        for request in [blank, not_numeric, bad_period] {
            let err = ledger.create_account(&request).unwrap_err();
            assert!(err.is_validation(), "unexpected error: {err}");
        }
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn add_activity_to_missing_account_fails() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());

        let result = ledger.add_activity("X_Y_1", "10");
        assert!(matches!(
            result,
            Err(LedgerError::NotFound { kind: RecordKind::Account, .. })
        ));
    }

    #[test]
    fn undecodable_account_reads_as_not_found() {
        let store = MemoryStore::new();
        store.put("A_B_100", b"not json").unwrap();
        let ledger = Ledger::new(&store, today());

        assert!(matches!(
            ledger.add_activity("A_B_100", "1"),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn overflowing_activity_is_rejected_and_account_stays_readable() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());
        ledger.create_account(&alpha_beta()).unwrap();

        ledger.add_activity("A_B_100", "1e308").unwrap();
        let err = ledger.add_activity("A_B_100", "1e308").unwrap_err();
        assert!(err.is_validation(), "unexpected error: {err}");

        let stored = String::from_utf8(store.get("A_B_100").unwrap().unwrap()).unwrap();
        assert!(!stored.contains("inf"), "stored {stored}");

        let account = ledger.add_activity("A_B_100", "1").unwrap();
        assert_eq!(account.activity.value(), 1e308 + 1.0);
    }

    #[test]
    fn next_period_refuses_to_roll_past_dec_9999() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());
        let mut request = alpha_beta();
        request.period = "Dec-9999".into();
        ledger.create_account(&request).unwrap();

        assert!(ledger.next_period("A_B_100").unwrap_err().is_validation());
        assert_eq!(
            ledger.get_account("A_B_100").unwrap().period.to_string(),
            "Dec-9999"
        );
    }

    #[test]
    fn next_period_resets_activity_and_advances_each_call() {
        let store = MemoryStore::new();
        let ledger = Ledger::new(&store, today());
        let mut request = alpha_beta();
        request.period = "Nov-2023".into();
        ledger.create_account(&request).unwrap();
        ledger.add_activity("A_B_100", "100").unwrap();

        let first = ledger.next_period("A_B_100").unwrap();
        assert_eq!(first.period.to_string(), "Dec-2023");
        assert_eq!(first.opening_balance.value(), 1100.0);

        ledger.add_activity("A_B_100", "50").unwrap();
        let second = ledger.next_period("A_B_100").unwrap();
        assert_eq!(second.period.to_string(), "Jan-2024");
        assert_eq!(second.opening_balance.value(), 1150.0);
        assert_eq!(second.activity, Amount::ZERO);

        let third = ledger.next_period("A_B_100").unwrap();
        assert_eq!(third.period.to_string(), "Feb-2024");
        assert_eq!(third.opening_balance.value(), 1150.0);
        assert_eq!(third.activity, Amount::ZERO);
    }
}
