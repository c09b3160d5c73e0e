//! License ledger: creation, lookup and deletion.

use intercompany_core::{LedgerDate, LedgerError, License, RecordKind, Result};
use intercompany_store::schema::index;
use intercompany_store::KvStore;

use crate::{parse_amount, require, state, Ledger};

/// Arguments of `create_license`, as received.
#[derive(Debug, Clone, Default)]
pub struct CreateLicense {
    /// Licensed part number.
    pub license_part_no: String,
    /// Entity that will hold the license.
    pub base_entity_code: String,
    /// Units, decimal text.
    pub quantity: String,
    /// Price per unit, decimal text.
    pub license_price: String,
    /// Annual support fee per unit, decimal text.
    pub support_fee: String,
    /// `MM-DD-YYYY`.
    pub license_start_date: String,
    /// `MM-DD-YYYY`.
    pub license_end_date: String,
    /// `MM-DD-YYYY`.
    pub support_start_date: String,
    /// `MM-DD-YYYY`.
    pub support_end_date: String,
    /// Currency code.
    pub currency: String,
    /// `MM-DD-YYYY`.
    pub last_settlement_date: String,
}

fn parse_date(field: &str, value: &str) -> Result<LedgerDate> {
    require(field, value)?;
    value
        .parse()
        .map_err(|e| LedgerError::validation(format!("{field}: {e}")))
}

impl CreateLicense {
    fn validate(&self) -> Result<License> {
        require("licensePartNo", &self.license_part_no)?;
        require("baseEntityCode", &self.base_entity_code)?;
        require("currency", &self.currency)?;

        let quantity = parse_amount("quantity", &self.quantity)?;
        if quantity.is_negative() {
            return Err(LedgerError::validation(format!(
                "quantity must not be negative, got {quantity}"
            )));
        }

        Ok(License {
            license_key: License::key(&self.license_part_no, &self.base_entity_code),
            license_part_no: self.license_part_no.clone(),
            base_entity_code: self.base_entity_code.clone(),
            quantity,
            license_price: parse_amount("licensePrice", &self.license_price)?,
            support_fee: parse_amount("supportFee", &self.support_fee)?,
            license_start_date: parse_date("licenseStartDate", &self.license_start_date)?,
            license_end_date: parse_date("licenseEndDate", &self.license_end_date)?,
            support_start_date: parse_date("supportStartDate", &self.support_start_date)?,
            support_end_date: parse_date("supportEndDate", &self.support_end_date)?,
            currency: self.currency.clone(),
            last_settlement_date: parse_date("lastSettlementDate", &self.last_settlement_date)?,
        })
    }
}

impl<S: KvStore + ?Sized> Ledger<'_, S> {
    /// Register a new license and add it to the license index.
    ///
    /// # Errors
    ///
    /// - `LedgerError::Validation` for a blank field, a non-numeric or negative
    ///   quantity, a non-numeric price or fee, or a malformed date.
    /// - `LedgerError::AlreadyExists` if the derived key holds a record.
    pub fn create_license(&self, request: &CreateLicense) -> Result<License> {
        let license = request.validate()?;
        self.insert_license(&license)?;

        tracing::info!(
            license_key = %license.license_key,
            quantity = %license.quantity,
            "License created"
        );
        Ok(license)
    }

    /// Load a license.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the key is empty or undecodable.
    pub fn get_license(&self, license_key: &str) -> Result<License> {
        require("licenseKey", license_key)?;
        state::load(self.store, RecordKind::License, license_key)
    }

    /// Every license in the license index, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be read.
    pub fn list_licenses(&self) -> Result<Vec<License>> {
        state::load_indexed(self.store, RecordKind::License, index::LICENSES)
    }

    /// Remove a license from the store and from the license index.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the key holds nothing.
    pub fn delete_license(&self, license_key: &str) -> Result<()> {
        require("licenseKey", license_key)?;
        self.remove_license(license_key)?;

        tracing::info!(license_key = %license_key, "License deleted");
        Ok(())
    }

    /// Persist a license under a fresh key and index it.
    pub(crate) fn insert_license(&self, license: &License) -> Result<()> {
        if state::exists(self.store, &license.license_key)? {
            return Err(LedgerError::AlreadyExists {
                kind: RecordKind::License,
                key: license.license_key.clone(),
            });
        }

        state::save(self.store, &license.license_key, license)?;
        state::index_add(self.store, index::LICENSES, &license.license_key)
    }

    /// Delete a license record and its index entry.
    pub(crate) fn remove_license(&self, license_key: &str) -> Result<()> {
        state::remove(self.store, RecordKind::License, license_key)?;
        state::index_drop(self.store, index::LICENSES, license_key)
    }
}
