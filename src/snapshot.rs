//! Accounts exported from, and loaded back into, a store.
//!
//! A snapshot is a CSV file with one account per row. Customers and deposito
//! types are referred to by name: rows sharing a name share the record.

use crate::ledger::{
    account::{Account, Balance},
    calendar::parse_timestamp,
    round_rate, AccountId, Amount, CustomerId, Rate,
};
use crate::store::{AccountDetails, DepositoType, MemoryStore, NewCustomer, NewDepositoType};

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed snapshot: {0}")]
    Csv(#[from] csv::Error),

    #[error("deposito type `{name}` is listed with yearly returns {first} and {second}")]
    ConflictingRate {
        name: String,
        first: Rate,
        second: Rate,
    },

    #[error(transparent)]
    Store(#[from] crate::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRow {
    #[serde(rename = "account")]
    pub account_id: AccountId,

    pub customer: String,
    pub packet: String,
    pub deposito_type: String,
    pub yearly_return: Rate,
    pub balance: Amount,

    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: NaiveDateTime,
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

impl From<&AccountDetails> for AccountRow {
    fn from(details: &AccountDetails) -> Self {
        Self {
            account_id: details.account.id,
            customer: details.customer.name.clone(),
            packet: details.account.packet.clone(),
            deposito_type: details.deposito_type.name.clone(),
            yearly_return: details.deposito_type.yearly_return,
            balance: details.account.balance.amount(),
            created_at: details.account.created_at,
        }
    }
}

// Loading stops at the first bad row: a partial set of accounts would make
// every later command against the missing ones fail, so it's better to fix
// the snapshot and start over.
pub fn load(input_stream: impl std::io::Read, store: &MemoryStore) -> Result<usize, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input_stream);

    let mut customers: HashMap<String, CustomerId> = HashMap::new();
    let mut deposito_types: HashMap<String, DepositoType> = HashMap::new();
    let mut loaded = 0;

    for row in reader.deserialize::<AccountRow>() {
        let row = row?;

        let deposito_type_id = match deposito_types.get(&row.deposito_type) {
            Some(known) => {
                if known.yearly_return != round_rate(row.yearly_return) {
                    return Err(Error::ConflictingRate {
                        name: row.deposito_type,
                        first: known.yearly_return,
                        second: row.yearly_return,
                    });
                }
                known.id
            }
            None => {
                let created = store.create_deposito_type(NewDepositoType {
                    name: row.deposito_type.clone(),
                    yearly_return: row.yearly_return,
                })?;
                let id = created.id;
                deposito_types.insert(row.deposito_type, created);
                id
            }
        };

        let customer_id = match customers.get(&row.customer) {
            Some(id) => *id,
            None => {
                let created = store.create_customer(NewCustomer {
                    name: row.customer.clone(),
                })?;
                customers.insert(row.customer, created.id);
                created.id
            }
        };

        store.restore_account(Account {
            id: row.account_id,
            packet: row.packet,
            balance: Balance::new(row.balance)?,
            customer_id,
            deposito_type_id,
            created_at: row.created_at,
        })?;
        loaded += 1;
    }

    tracing::info!(
        accounts = loaded,
        customers = customers.len(),
        deposito_types = deposito_types.len(),
        "loaded snapshot"
    );

    Ok(loaded)
}

#[cfg(test)]
mod snapshot_tests {
    use super::{load, Error};
    use crate::store::{AccountStore, MemoryStore};

    use rust_decimal_macros::dec;

    const HEADER: &str = "account,customer,packet,deposito_type,yearly_return,balance,created_at";

    #[test]
    fn test_load() {
        let data = format!(
            r#"{HEADER}
67e55044-10b1-426f-9247-bb680e5fe0c8, John Miller, Standard, Gold,   0.07, 1000.00, 2024-01-15T10:00:00
2b1c9d4e-4d2a-4f8e-9a51-0c7c1f0e3a11, John Miller, Premium,  Silver, 0.05, 250.5,   2024-02-01
9f0b6a7e-8c34-4b61-a0d5-5e2f7a9c1d22, Jane Miller, Standard, Gold,   0.07, 0,       2024-03-01T08:30:00Z"#
        );
        let store = MemoryStore::new();

        assert_eq!(3, load(std::io::Cursor::new(data), &store).unwrap());
        assert_eq!(2, store.list_customers().unwrap().len());
        assert_eq!(2, store.list_deposito_types().unwrap().len());

        let id = uuid::Uuid::parse_str("2b1c9d4e-4d2a-4f8e-9a51-0c7c1f0e3a11").unwrap();
        let details = store.get_account_details(id).unwrap();
        assert_eq!(dec!(250.50), details.account.balance.amount());
        assert_eq!("Premium", details.account.packet);
        assert_eq!("John Miller", details.customer.name);
        assert_eq!("Silver", details.deposito_type.name);
        assert!(store.transactions(id).unwrap().is_empty());
    }

    #[test]
    fn test_load_conflicting_rates() {
        let data = format!(
            r#"{HEADER}
67e55044-10b1-426f-9247-bb680e5fe0c8,John Miller,Standard,Gold,0.07,1000.00,2024-01-15
2b1c9d4e-4d2a-4f8e-9a51-0c7c1f0e3a11,John Miller,Standard,Gold,0.08,1000.00,2024-01-15"#
        );

        let got = load(std::io::Cursor::new(data), &MemoryStore::new());

        assert!(matches!(got, Err(Error::ConflictingRate { .. })), "{:?}", got);
    }

    #[test]
    fn test_load_invalid() {
        for (row, want) in vec![
            (
                // Same account twice.
                "67e55044-10b1-426f-9247-bb680e5fe0c8,John Miller,Standard,Gold,0.07,1,2024-01-15\n67e55044-10b1-426f-9247-bb680e5fe0c8,John Miller,Standard,Gold,0.07,1,2024-01-15",
                "conflict",
            ),
            (
                "67e55044-10b1-426f-9247-bb680e5fe0c8,John Miller,Standard,Gold,0.07,-1,2024-01-15",
                "must not be negative",
            ),
            (
                "67e55044-10b1-426f-9247-bb680e5fe0c8,John Miller,Standard,Gold,1.5,1,2024-01-15",
                "between 0 and 1",
            ),
            (
                "67e55044-10b1-426f-9247-bb680e5fe0c8,John Miller,Standard,Gold,0.07,1,yesterday",
                "malformed date",
            ),
        ] {
            let data = format!("{HEADER}\n{row}");

            let got = load(std::io::Cursor::new(data), &MemoryStore::new());

            match got {
                Err(err) => assert!(err.to_string().contains(want), "{}", err),
                Ok(_) => panic!("loading `{row}` should fail"),
            }
        }
    }
}
