//! Transfer and settlement workflows.
//!
//! Both workflows touch several keys. They run in two phases: every argument
//! is checked, every referenced record is loaded and every charge and posting
//! is computed in memory; only then is anything written. Failures a caller can
//! provoke therefore leave the store untouched. Store failures during the
//! write phase are surfaced as-is; undoing earlier writes is the job of the
//! surrounding transaction.
//!
//! Transfer order:
//!
//! 1. settle the target license (merge only), then grow it or create it
//! 2. post the license charge to both license accounts
//! 3. settle the source license at its pre-transfer quantity
//! 4. shrink or delete the source license

use std::collections::BTreeMap;

use intercompany_core::{Account, Amount, LedgerError, License, RecordKind, Result};
use intercompany_store::KvStore;

use crate::{parse_amount, require, state, Ledger};

/// Arguments of `transfer_license`, as received.
#[derive(Debug, Clone, Default)]
pub struct TransferLicense {
    /// License the quantity moves out of.
    pub source_license_key: String,
    /// Entity receiving the quantity.
    pub target_entity_code: String,
    /// Units to move, decimal text.
    pub quantity: String,
    /// Account credited with the license charge.
    pub source_license_account_key: String,
    /// Account debited with the license charge.
    pub target_license_account_key: String,
    /// Account billed for the source license's outstanding support.
    pub source_support_account_key: String,
    /// Account billed for the target license's outstanding support.
    pub target_support_account_key: String,
}

/// Result of settling one license.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    /// The settled license, as persisted.
    pub license: License,
    /// Account the charge was posted to.
    pub account_key: String,
    /// Whole months billed.
    pub months: i32,
    /// Support charge posted.
    pub support_charge: Amount,
}

/// Result of a license transfer.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    /// Key of the license that received the quantity.
    pub target_license_key: String,
    /// Whether the target license existed before the transfer.
    pub merged: bool,
    /// Charge posted to the source license account; its negation went to the
    /// target license account.
    pub license_charge: Amount,
    /// Support settled on the target before the merge.
    pub target_settlement: Option<Settlement>,
    /// Support settled on the source.
    pub source_settlement: Settlement,
    /// Whether the source license was emptied and deleted.
    pub source_deleted: bool,
}

/// Accounts a workflow posts to, loaded once and updated in memory.
struct Postings {
    accounts: BTreeMap<String, Account>,
}

impl Postings {
    /// Post `amount` to a loaded account. Repeated postings to one key
    /// accumulate.
    fn post(&mut self, account_key: &str, amount: Amount) -> Result<()> {
        let account = self
            .accounts
            .get_mut(account_key)
            .ok_or_else(|| LedgerError::NotFound {
                kind: RecordKind::Account,
                key: account_key.to_string(),
            })?;
        account.post_activity(amount)
    }
}

impl<S: KvStore + ?Sized> Ledger<'_, S> {
    /// Bill a license's support from its last settlement date up to today.
    ///
    /// # Errors
    ///
    /// - `LedgerError::NotFound` if the license or the account is missing.
    /// - `LedgerError::Validation` if the charge, or the account balance after
    ///   posting it, is not a finite amount. Nothing is written in that case.
    pub fn settle_bill(&self, license_key: &str, account_key: &str) -> Result<Settlement> {
        require("licenseKey", license_key)?;
        require("accountKey", account_key)?;

        let license: License = state::load(self.store, RecordKind::License, license_key)?;
        let mut postings = self.load_postings(&[account_key])?;
        let settlement = self.settle(license, account_key, &mut postings)?;

        // Writes start here.
        self.save_postings(postings)?;
        state::save(self.store, &settlement.license.license_key, &settlement.license)?;

        tracing::info!(
            license_key = %settlement.license.license_key,
            account_key = %account_key,
            months = settlement.months,
            support_charge = %settlement.support_charge,
            "Support bill settled"
        );
        Ok(settlement)
    }

    /// Move `quantity` units of a license to another entity, billing the
    /// license charge and settling outstanding support on both sides.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a blank argument, a non-positive or
    ///   non-numeric quantity, a transfer to the holding entity itself, a
    ///   target key that holds something other than a license, or a charge,
    ///   balance or quantity that would not be a finite amount.
    /// - `LedgerError::NotFound` if the source license or a referenced account
    ///   is missing.
    /// - `LedgerError::InsufficientQuantity` if the source holds fewer units.
    #[allow(clippy::float_cmp)]
    pub fn transfer_license(&self, request: &TransferLicense) -> Result<TransferOutcome> {
        let fields = [
            ("sourceLicenseKey", &request.source_license_key),
            ("targetEntityCode", &request.target_entity_code),
            ("sourceLicenseAccountKey", &request.source_license_account_key),
            ("targetLicenseAccountKey", &request.target_license_account_key),
            ("sourceSupportAccountKey", &request.source_support_account_key),
            ("targetSupportAccountKey", &request.target_support_account_key),
        ];
        for (field, value) in fields {
            require(field, value)?;
        }
        let quantity = parse_amount("quantity", &request.quantity)?;
        if !quantity.is_positive() {
            return Err(LedgerError::validation(format!(
                "transfer quantity must be positive, got {quantity}"
            )));
        }

        let source: License =
            state::load(self.store, RecordKind::License, &request.source_license_key)?;
        let target_key = License::key(&source.license_part_no, &request.target_entity_code);
        if target_key == source.license_key {
            return Err(LedgerError::validation(format!(
                "license {target_key} is already held by {}",
                request.target_entity_code
            )));
        }

        let license_charge = source.license_charge(quantity, self.today)?;

        if quantity > source.quantity {
            return Err(LedgerError::InsufficientQuantity {
                key: source.license_key,
                held: source.quantity,
                requested: quantity,
            });
        }

        let target: Option<License> =
            match state::try_load(self.store, RecordKind::License, &target_key) {
                Err(LedgerError::NotFound { .. }) => {
                    return Err(LedgerError::validation(format!(
                        "target key {target_key} holds a record that is not a license"
                    )));
                }
                other => other?,
            };

        let mut account_keys = vec![
            request.source_license_account_key.as_str(),
            request.target_license_account_key.as_str(),
            request.source_support_account_key.as_str(),
        ];
        if target.is_some() {
            account_keys.push(request.target_support_account_key.as_str());
        }
        let mut postings = self.load_postings(&account_keys)?;

        let merged = target.is_some();
        let (target_license, target_settlement) = match target {
            Some(existing) => {
                let settlement =
                    self.settle(existing, &request.target_support_account_key, &mut postings)?;
                let mut grown = settlement.license.clone();
                grown.quantity = grown.quantity.checked_add(quantity)?;
                (grown, Some(settlement))
            }
            None => (
                source.transferred_to(&request.target_entity_code, quantity, self.today),
                None,
            ),
        };

        postings.post(&request.source_license_account_key, license_charge)?;
        postings.post(&request.target_license_account_key, -license_charge)?;

        let source_settlement =
            self.settle(source, &request.source_support_account_key, &mut postings)?;
        let mut remaining = source_settlement.license.clone();
        let source_deleted = quantity == remaining.quantity;
        if !source_deleted {
            remaining.quantity = remaining.quantity.checked_sub(quantity)?;
        }

        // Writes start here.
        if merged {
            state::save(self.store, &target_key, &target_license)?;
        } else {
            self.insert_license(&target_license)?;
        }
        self.save_postings(postings)?;
        if source_deleted {
            self.remove_license(&remaining.license_key)?;
        } else {
            state::save(self.store, &remaining.license_key, &remaining)?;
        }

        tracing::info!(
            source = %remaining.license_key,
            target = %target_key,
            quantity = %quantity,
            license_charge = %license_charge,
            merged,
            source_deleted,
            "License transferred"
        );

        Ok(TransferOutcome {
            target_license_key: target_key,
            merged,
            license_charge,
            target_settlement,
            source_settlement,
            source_deleted,
        })
    }

    /// Compute the outstanding support charge for `license`, post it to
    /// `account_key` in `postings` and advance the settlement date. Nothing is
    /// written.
    fn settle(
        &self,
        mut license: License,
        account_key: &str,
        postings: &mut Postings,
    ) -> Result<Settlement> {
        let months = license.last_settlement_date.months_until(&self.today);
        let support_charge = license.support_charge(self.today)?;

        postings.post(account_key, support_charge)?;
        license.last_settlement_date = self.today;

        Ok(Settlement {
            license,
            account_key: account_key.to_string(),
            months,
            support_charge,
        })
    }

    /// Load every listed account, failing on the first missing one.
    fn load_postings(&self, account_keys: &[&str]) -> Result<Postings> {
        let mut accounts = BTreeMap::new();
        for &key in account_keys {
            if !accounts.contains_key(key) {
                let account: Account = state::load(self.store, RecordKind::Account, key)?;
                accounts.insert(key.to_string(), account);
            }
        }
        Ok(Postings { accounts })
    }

    fn save_postings(&self, postings: Postings) -> Result<()> {
        for (key, account) in &postings.accounts {
            state::save(self.store, key, account)?;
            tracing::debug!(
                account_key = %key,
                activity = %account.activity,
                balance = %account.period_to_date_balance,
                "Activity posted"
            );
        }
        Ok(())
    }
}
