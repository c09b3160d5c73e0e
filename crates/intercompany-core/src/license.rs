//! License entitlement records and their billing arithmetic.

use serde::{Deserialize, Serialize};

use crate::{Amount, AmountError, LedgerDate};

/// Months over which a license price is amortized when quantity changes hands.
pub const LICENSE_AMORTIZATION_MONTHS: f64 = 60.0;

/// Support fees are quoted per year; settlement bills per elapsed month.
pub const SUPPORT_BILLING_MONTHS: f64 = 12.0;

/// A billable software entitlement held by one entity for one part number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// Storage key, see [`License::key`].
    pub license_key: String,

    /// Licensed part number.
    pub license_part_no: String,

    /// Entity holding the entitlement.
    pub base_entity_code: String,

    /// Units held. Never negative.
    pub quantity: Amount,

    /// Price per unit.
    pub license_price: Amount,

    /// Annual support fee per unit.
    pub support_fee: Amount,

    /// Start of the license term.
    pub license_start_date: LedgerDate,

    /// End of the license term.
    pub license_end_date: LedgerDate,

    /// Start of the support term.
    pub support_start_date: LedgerDate,

    /// End of the support term.
    pub support_end_date: LedgerDate,

    /// Currency code.
    pub currency: String,

    /// Date support was last billed up to.
    pub last_settlement_date: LedgerDate,
}

impl License {
    /// Derive the storage key for a license.
    #[must_use]
    pub fn key(part_no: &str, entity_code: &str) -> String {
        format!("{part_no}_{entity_code}")
    }

    /// A copy of this license's terms, held by `entity_code` with `quantity`
    /// units and settled up to `today`.
    #[must_use]
    pub fn transferred_to(&self, entity_code: &str, quantity: Amount, today: LedgerDate) -> Self {
        Self {
            license_key: Self::key(&self.license_part_no, entity_code),
            license_part_no: self.license_part_no.clone(),
            base_entity_code: entity_code.to_string(),
            quantity,
            last_settlement_date: today,
            ..self.clone()
        }
    }

    /// Charge for moving `quantity` units out of this license on `today`:
    /// `quantity * months_since_license_start * license_price / 60`.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::NotFinite` if the product overflows.
    pub fn license_charge(&self, quantity: Amount, today: LedgerDate) -> Result<Amount, AmountError> {
        let months = f64::from(self.license_start_date.months_until(&today));
        Amount::new(
            quantity.value() * months * self.license_price.value() / LICENSE_AMORTIZATION_MONTHS,
        )
    }

    /// Support owed from the last settlement up to `today`:
    /// `support_fee * quantity * elapsed_months / 12`.
    ///
    /// Zero when `today` is in the month of the last settlement.
    ///
    /// # Errors
    ///
    /// Returns `AmountError::NotFinite` if the product overflows.
    pub fn support_charge(&self, today: LedgerDate) -> Result<Amount, AmountError> {
        let months = f64::from(self.last_settlement_date.months_until(&today));
        Amount::new(
            self.support_fee.value() * self.quantity.value() * months / SUPPORT_BILLING_MONTHS,
        )
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn date(text: &str) -> LedgerDate {
        text.parse().unwrap()
    }

    fn p1_e1() -> License {
        License {
            license_key: License::key("P1", "E1"),
            license_part_no: "P1".into(),
            base_entity_code: "E1".into(),
            quantity: "10".parse().unwrap(),
            license_price: "120".parse().unwrap(),
            support_fee: "12".parse().unwrap(),
            license_start_date: date("01-01-2024"),
            license_end_date: date("12-31-2028"),
            support_start_date: date("01-01-2024"),
            support_end_date: date("12-31-2025"),
            currency: "USD".into(),
            last_settlement_date: date("01-01-2024"),
        }
    }

    #[test]
    fn support_charge_prorates_elapsed_months() {
        let charge = p1_e1().support_charge(date("06-15-2024")).unwrap();
        assert_eq!(charge.value(), 50.0);
    }

    #[test]
    fn support_charge_is_zero_within_settled_month() {
        let charge = p1_e1().support_charge(date("01-28-2024")).unwrap();
        assert_eq!(charge, Amount::ZERO);
    }

    #[test]
    fn support_charge_goes_negative_for_backdated_settlement() {
        let mut license = p1_e1();
        license.last_settlement_date = date("03-01-2024");
        let charge = license.support_charge(date("01-01-2024")).unwrap();
        assert_eq!(charge.value(), -20.0);
    }

    #[test]
    fn license_charge_amortizes_over_sixty_months() {
        let charge = p1_e1()
            .license_charge("4".parse().unwrap(), date("07-01-2024"))
            .unwrap();
        // 4 units * 6 months * 120 / 60
        assert_eq!(charge.value(), 48.0);
    }

    #[test]
    fn transferred_copy_keeps_terms() {
        let source = p1_e1();
        let copy = source.transferred_to("E2", "3".parse().unwrap(), date("05-10-2024"));

        assert_eq!(copy.license_key, "P1_E2");
        assert_eq!(copy.base_entity_code, "E2");
        assert_eq!(copy.quantity.value(), 3.0);
        assert_eq!(copy.last_settlement_date, date("05-10-2024"));
        assert_eq!(copy.license_price, source.license_price);
        assert_eq!(copy.support_fee, source.support_fee);
        assert_eq!(copy.license_start_date, source.license_start_date);
        assert_eq!(copy.support_end_date, source.support_end_date);
        assert_eq!(copy.currency, source.currency);
    }

    #[test]
    fn persisted_form_uses_camel_case_text_fields() {
        let json = serde_json::to_value(p1_e1()).unwrap();
        assert_eq!(json["licenseKey"], "P1_E1");
        assert_eq!(json["quantity"], "10");
        assert_eq!(json["licenseStartDate"], "01-01-2024");
        assert_eq!(json["lastSettlementDate"], "01-01-2024");
    }
}
