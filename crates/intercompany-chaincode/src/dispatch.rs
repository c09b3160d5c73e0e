//! String-argument dispatcher.
//!
//! Hosts call [`Chaincode::invoke`] with a function name and positional string
//! arguments. Write operations return no payload; `read` and the list
//! functions return bytes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use intercompany_core::{LedgerError, Result};
use intercompany_store::schema::index;
use intercompany_store::{index_reset, KvStore};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::{require, CreateAccount, CreateLicense, Ledger, TransferLicense};

/// Functions a host can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    /// Reset both enumeration indexes to empty.
    Init,
    /// Return the raw bytes stored at a key.
    Read,
    /// Open an intercompany account.
    CreateAccount,
    /// Post an amount to an account.
    AddActivity,
    /// Roll an account into its next period.
    NextPeriod,
    /// Register a license.
    CreateLicense,
    /// Remove a license.
    DeleteLicense,
    /// Move license quantity to another entity.
    TransferLicense,
    /// Bill outstanding support on a license.
    SettleBill,
    /// Return every indexed account.
    ListAccounts,
    /// Return every indexed license.
    ListLicenses,
}

impl Function {
    /// Every function, in dispatch-table order.
    pub const ALL: [Self; 11] = [
        Self::Init,
        Self::Read,
        Self::CreateAccount,
        Self::AddActivity,
        Self::NextPeriod,
        Self::CreateLicense,
        Self::DeleteLicense,
        Self::TransferLicense,
        Self::SettleBill,
        Self::ListAccounts,
        Self::ListLicenses,
    ];

    /// The name hosts invoke this function by.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Read => "read",
            Self::CreateAccount => "create_account",
            Self::AddActivity => "add_activity",
            Self::NextPeriod => "next_period",
            Self::CreateLicense => "create_license",
            Self::DeleteLicense => "delete_license",
            Self::TransferLicense => "transfer_license",
            Self::SettleBill => "settle_bill",
            Self::ListAccounts => "list_accounts",
            Self::ListLicenses => "list_licenses",
        }
    }

    /// Number of positional arguments the function takes.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Init | Self::ListAccounts | Self::ListLicenses => 0,
            Self::Read | Self::NextPeriod | Self::DeleteLicense => 1,
            Self::AddActivity | Self::SettleBill => 2,
            Self::TransferLicense => 7,
            Self::CreateAccount => 10,
            Self::CreateLicense => 11,
        }
    }

    /// Whether the function only reads state.
    #[must_use]
    pub const fn is_read_only(self) -> bool {
        matches!(self, Self::Read | Self::ListAccounts | Self::ListLicenses)
    }
}

impl FromStr for Function {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| LedgerError::validation(format!("unknown function '{s}'")))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The ledger's invoke entry point.
#[derive(Clone)]
pub struct Chaincode {
    clock: Arc<dyn Clock>,
}

impl Chaincode {
    /// Create a dispatcher that takes business dates from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Create a dispatcher on the system clock.
    #[must_use]
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Run one function against `store`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for an unknown function or a wrong
    /// argument count, and otherwise whatever the operation returns.
    pub fn invoke<S: KvStore + ?Sized>(
        &self,
        store: &S,
        function: &str,
        args: &[String],
    ) -> Result<Option<Vec<u8>>> {
        let function: Function = function.parse()?;
        if args.len() != function.arity() {
            return Err(LedgerError::validation(format!(
                "incorrect number of arguments for {function}: expected {}, got {}",
                function.arity(),
                args.len()
            )));
        }

        let ledger = Ledger::new(store, self.clock.today());
        tracing::debug!(%function, today = %ledger.today(), "Invoking");

        match function {
            Function::Init => {
                index_reset(store, index::ACCOUNTS)
                    .and_then(|()| index_reset(store, index::LICENSES))
                    .map_err(|e| LedgerError::Write(e.to_string()))?;
                tracing::info!("Indexes reset");
                Ok(None)
            }
            Function::Read => {
                require("key", &args[0])?;
                store
                    .get(&args[0])
                    .map_err(|e| LedgerError::Read(e.to_string()))
            }
            Function::CreateAccount => {
                ledger.create_account(&CreateAccount {
                    due_to_entity_code: args[0].clone(),
                    due_from_entity_code: args[1].clone(),
                    due_to_entity_name: args[2].clone(),
                    due_from_entity_name: args[3].clone(),
                    currency: args[4].clone(),
                    period: args[5].clone(),
                    opening_balance: args[6].clone(),
                    activity: args[7].clone(),
                    account_no: args[8].clone(),
                    account_name: args[9].clone(),
                })?;
                Ok(None)
            }
            Function::AddActivity => {
                ledger.add_activity(&args[0], &args[1])?;
                Ok(None)
            }
            Function::NextPeriod => {
                ledger.next_period(&args[0])?;
                Ok(None)
            }
            Function::CreateLicense => {
                ledger.create_license(&CreateLicense {
                    license_part_no: args[0].clone(),
                    base_entity_code: args[1].clone(),
                    quantity: args[2].clone(),
                    license_price: args[3].clone(),
                    support_fee: args[4].clone(),
                    license_start_date: args[5].clone(),
                    license_end_date: args[6].clone(),
                    support_start_date: args[7].clone(),
                    support_end_date: args[8].clone(),
                    currency: args[9].clone(),
                    last_settlement_date: args[10].clone(),
                })?;
                Ok(None)
            }
            Function::DeleteLicense => {
                ledger.delete_license(&args[0])?;
                Ok(None)
            }
            Function::TransferLicense => {
                ledger.transfer_license(&TransferLicense {
                    source_license_key: args[0].clone(),
                    target_entity_code: args[1].clone(),
                    quantity: args[2].clone(),
                    source_license_account_key: args[3].clone(),
                    target_license_account_key: args[4].clone(),
                    source_support_account_key: args[5].clone(),
                    target_support_account_key: args[6].clone(),
                })?;
                Ok(None)
            }
            Function::SettleBill => {
                ledger.settle_bill(&args[0], &args[1])?;
                Ok(None)
            }
            Function::ListAccounts => encode(&ledger.list_accounts()?).map(Some),
            Function::ListLicenses => encode(&ledger.list_licenses()?).map(Some),
        }
    }
}

impl fmt::Debug for Chaincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chaincode")
            .field("today", &self.clock.today())
            .finish()
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| LedgerError::Read(format!("failed to encode payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use intercompany_core::{Account, LedgerDate, License, RecordKind};
    use intercompany_store::{index_list, MemoryStore};

    use crate::FixedClock;

    fn chaincode(month: u32) -> Chaincode {
        let today = LedgerDate::from_ymd(2024, month, 1).unwrap();
        Chaincode::new(Arc::new(FixedClock::new(today)))
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn read_json(chaincode: &Chaincode, store: &MemoryStore, key: &str) -> serde_json::Value {
        let bytes = chaincode
            .invoke(store, "read", &args(&[key]))
            .unwrap()
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn function_names_round_trip() {
        for function in Function::ALL {
            assert_eq!(function.name().parse::<Function>().unwrap(), function);
        }
    }

    #[test]
    fn unknown_function_is_rejected() {
        let store = MemoryStore::new();
        let err = chaincode(1).invoke(&store, "mint", &[]).unwrap_err();
        assert_eq!(err.to_string(), "validation failed: unknown function 'mint'");
    }

    #[test]
    fn wrong_argument_count_is_rejected() {
        let store = MemoryStore::new();
        let err = chaincode(1)
            .invoke(&store, "create_account", &args(&["A", "B"]))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("expected 10, got 2"));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn read_of_missing_key_returns_no_payload() {
        let store = MemoryStore::new();
        assert!(chaincode(1)
            .invoke(&store, "read", &args(&["nothing"]))
            .unwrap()
            .is_none());
    }

    #[test]
    fn account_lifecycle_through_invoke() {
        let store = MemoryStore::new();
        let cc = chaincode(1);

        cc.invoke(
            &store,
            "create_account",
            &args(&["A", "B", "Alpha", "Beta", "USD", "Jan-2024", "1000", "0", "100", "Fees"]),
        )
        .unwrap();
        cc.invoke(&store, "add_activity", &args(&["A_B_100", "250"]))
            .unwrap();

        let record = read_json(&cc, &store, "A_B_100");
        assert_eq!(record["activity"], "250");
        assert_eq!(record["periodToDateBalance"], "1250");

        cc.invoke(&store, "next_period", &args(&["A_B_100"])).unwrap();
        let record = read_json(&cc, &store, "A_B_100");
        assert_eq!(record["openingBalance"], "1250");
        assert_eq!(record["activity"], "0");
        assert_eq!(record["period"], "Feb-2024");

        let listed: Vec<Account> = serde_json::from_slice(
            &cc.invoke(&store, "list_accounts", &[]).unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].account_key, "A_B_100");
    }

    #[test]
    fn license_settlement_through_invoke() {
        let store = MemoryStore::new();
        let january = chaincode(1);

        january
            .invoke(
                &store,
                "create_account",
                &args(&["E1", "HQ", "Entity 1", "Head office", "USD", "Jan-2024", "0", "0", "900", "Support"]),
            )
            .unwrap();
        january
            .invoke(
                &store,
                "create_license",
                &args(&[
                    "P1", "E1", "10", "120", "12", "01-01-2024", "12-31-2028", "01-01-2024",
                    "12-31-2028", "USD", "01-01-2024",
                ]),
            )
            .unwrap();

        let june = chaincode(6);
        june.invoke(&store, "settle_bill", &args(&["P1_E1", "E1_HQ_900"]))
            .unwrap();
        june.invoke(&store, "settle_bill", &args(&["P1_E1", "E1_HQ_900"]))
            .unwrap();

        let account = read_json(&june, &store, "E1_HQ_900");
        assert_eq!(account["activity"], "50");
        let license = read_json(&june, &store, "P1_E1");
        assert_eq!(license["lastSettlementDate"], "06-01-2024");

        let listed: Vec<License> = serde_json::from_slice(
            &june.invoke(&store, "list_licenses", &[]).unwrap().unwrap(),
        )
        .unwrap();
        assert_eq!(listed[0].license_key, "P1_E1");

        june.invoke(&store, "delete_license", &args(&["P1_E1"]))
            .unwrap();
        let err = june
            .invoke(&store, "delete_license", &args(&["P1_E1"]))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::NotFound { kind: RecordKind::License, .. }
        ));
    }

    #[test]
    fn init_resets_indexes() {
        let store = MemoryStore::new();
        let cc = chaincode(1);
        cc.invoke(
            &store,
            "create_account",
            &args(&["A", "B", "Alpha", "Beta", "USD", "Jan-2024", "1", "0", "1", "X"]),
        )
        .unwrap();

        cc.invoke(&store, "init", &[]).unwrap();

        assert!(index_list(&store, index::ACCOUNTS).unwrap().is_empty());
        assert_eq!(store.get(index::LICENSES).unwrap().unwrap(), b"[]");
    }
}
