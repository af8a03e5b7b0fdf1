use super::memory::{entry, lock, read, write, AccountEntry, MemoryStore};
use super::{validate_name, Customer, DepositoType};
use crate::error::Resource;
use crate::ledger::{
    account::{Account, Balance},
    AccountId, Amount, CustomerId, DepositoTypeId,
};
use crate::Error;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    pub packet: String,
    pub balance: Amount,
    pub customer_id: CustomerId,
    pub deposito_type_id: DepositoTypeId,

    /// Defaults to now.
    pub created_at: Option<NaiveDateTime>,
}

/// Only the packet and the owner can change. Balances move through deposits
/// and withdrawals, and the deposito type is fixed at opening.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub packet: Option<String>,
    pub customer_id: Option<CustomerId>,
}

/// An account joined with its owner and its deposito type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountDetails {
    #[serde(flatten)]
    pub account: Account,
    pub customer: Customer,
    pub deposito_type: DepositoType,
}

fn details(
    account: Account,
    customers: &HashMap<CustomerId, Customer>,
    deposito_types: &HashMap<DepositoTypeId, DepositoType>,
) -> Result<AccountDetails, Error> {
    let customer = customers
        .get(&account.customer_id)
        .cloned()
        .ok_or_else(|| Error::not_found(Resource::Customer, account.customer_id))?;
    let deposito_type = deposito_types
        .get(&account.deposito_type_id)
        .cloned()
        .ok_or_else(|| Error::not_found(Resource::DepositoType, account.deposito_type_id))?;

    Ok(AccountDetails {
        account,
        customer,
        deposito_type,
    })
}

fn ensure_exists<T>(
    records: &HashMap<uuid::Uuid, T>,
    resource: Resource,
    id: uuid::Uuid,
) -> Result<(), Error> {
    if !records.contains_key(&id) {
        return Err(Error::not_found(resource, id));
    }

    Ok(())
}

impl MemoryStore {
    /// List accounts with their owner and deposito type, oldest first.
    pub fn list_accounts(&self) -> Result<Vec<AccountDetails>, Error> {
        let customers = read(&self.customers, "customer")?;
        let deposito_types = read(&self.deposito_types, "deposito type")?;
        let accounts = read(&self.accounts, "account map")?;

        let mut listed = accounts
            .values()
            .map(|entry| {
                let account = lock(entry)?.account.clone();
                details(account, &customers, &deposito_types)
            })
            .collect::<Result<Vec<_>, Error>>()?;
        listed.sort_by(|a, b| {
            a.account
                .created_at
                .cmp(&b.account.created_at)
                .then(a.account.id.cmp(&b.account.id))
        });

        Ok(listed)
    }

    pub fn get_account_details(&self, account_id: AccountId) -> Result<AccountDetails, Error> {
        let customers = read(&self.customers, "customer")?;
        let deposito_types = read(&self.deposito_types, "deposito type")?;
        let accounts = read(&self.accounts, "account map")?;
        let account = lock(entry(&accounts, account_id)?)?.account.clone();

        details(account, &customers, &deposito_types)
    }

    /// Open an account for an existing customer under an existing deposito type.
    pub fn create_account(&self, new_account: NewAccount) -> Result<Account, Error> {
        validate_name("Packet", &new_account.packet)?;
        let balance = Balance::new(new_account.balance)?;

        let account = Account {
            id: uuid::Uuid::new_v4(),
            packet: new_account.packet,
            balance,
            customer_id: new_account.customer_id,
            deposito_type_id: new_account.deposito_type_id,
            created_at: new_account
                .created_at
                .unwrap_or_else(|| chrono::Utc::now().naive_utc()),
        };

        self.insert_account(account)
    }

    /// Put back an account with its id, balance and opening date as given,
    /// e.g. when loading a snapshot. The account starts with an empty ledger.
    pub fn restore_account(&self, account: Account) -> Result<Account, Error> {
        validate_name("Packet", &account.packet)?;

        self.insert_account(account)
    }

    fn insert_account(&self, account: Account) -> Result<Account, Error> {
        let customers = read(&self.customers, "customer")?;
        let deposito_types = read(&self.deposito_types, "deposito type")?;
        ensure_exists(&customers, Resource::Customer, account.customer_id)?;
        ensure_exists(&deposito_types, Resource::DepositoType, account.deposito_type_id)?;

        let mut accounts = write(&self.accounts, "account map")?;
        if accounts.contains_key(&account.id) {
            return Err(Error::Conflict(format!(
                "account {} already exists",
                account.id
            )));
        }
        accounts.insert(
            account.id,
            Mutex::new(AccountEntry {
                account: account.clone(),
                transactions: Vec::new(),
            }),
        );
        tracing::info!(
            account_id = %account.id,
            customer_id = %account.customer_id,
            balance = %account.balance.amount(),
            "opened account"
        );

        Ok(account)
    }

    pub fn update_account(
        &self,
        account_id: AccountId,
        update: AccountUpdate,
    ) -> Result<Account, Error> {
        if let Some(packet) = &update.packet {
            validate_name("Packet", packet)?;
        }

        let customers = read(&self.customers, "customer")?;
        if let Some(customer_id) = update.customer_id {
            ensure_exists(&customers, Resource::Customer, customer_id)?;
        }

        let accounts = read(&self.accounts, "account map")?;
        let mut entry = lock(entry(&accounts, account_id)?)?;
        if let Some(packet) = update.packet {
            entry.account.packet = packet;
        }
        if let Some(customer_id) = update.customer_id {
            entry.account.customer_id = customer_id;
        }

        Ok(entry.account.clone())
    }

    /// Delete an account. Accounts with ledger entries are kept for the record.
    pub fn delete_account(&self, account_id: AccountId) -> Result<(), Error> {
        let mut accounts = write(&self.accounts, "account map")?;
        if !lock(entry(&accounts, account_id)?)?.transactions.is_empty() {
            return Err(Error::Conflict(format!(
                "account {account_id} has transactions"
            )));
        }

        accounts.remove(&account_id);
        tracing::info!(%account_id, "deleted account");

        Ok(())
    }
}

#[cfg(test)]
mod account_tests {
    use super::{AccountUpdate, NewAccount};
    use crate::error::Resource;
    use crate::ledger::account::account::test_utils::opened_at;
    use crate::store::{AccountStore, MemoryStore, NewCustomer, NewDepositoType};
    use crate::Error;

    use rust_decimal_macros::dec;

    struct Fixture {
        store: MemoryStore,
        customer_id: uuid::Uuid,
        deposito_type_id: uuid::Uuid,
    }

    fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let customer = store
            .create_customer(NewCustomer {
                name: "John Miller".to_string(),
            })
            .unwrap();
        let silver = store
            .create_deposito_type(NewDepositoType {
                name: "Silver".to_string(),
                yearly_return: dec!(0.05),
            })
            .unwrap();

        Fixture {
            store,
            customer_id: customer.id,
            deposito_type_id: silver.id,
        }
    }

    impl Fixture {
        fn new_account(&self, balance: rust_decimal::Decimal) -> NewAccount {
            NewAccount {
                packet: "Standard".to_string(),
                balance,
                customer_id: self.customer_id,
                deposito_type_id: self.deposito_type_id,
                created_at: Some(opened_at("2024-01-15 10:00")),
            }
        }
    }

    #[test]
    fn test_create_account() {
        let f = fixture();

        let account = f.store.create_account(f.new_account(dec!(1000.005))).unwrap();
        assert_eq!(dec!(1000.01), account.balance.amount());
        assert_eq!(opened_at("2024-01-15 10:00"), account.created_at);
        assert_eq!(Ok(account.clone()), f.store.get_account(account.id));

        let details = f.store.get_account_details(account.id).unwrap();
        assert_eq!(account, details.account);
        assert_eq!("John Miller", details.customer.name);
        assert_eq!(dec!(0.05), details.deposito_type.yearly_return);
    }

    #[test]
    fn test_create_account_defaults_to_now() {
        let f = fixture();
        let before = chrono::Utc::now().naive_utc();

        let account = f
            .store
            .create_account(NewAccount {
                created_at: None,
                ..f.new_account(dec!(0))
            })
            .unwrap();

        assert!(account.created_at >= before);
        assert!(account.created_at <= chrono::Utc::now().naive_utc());
    }

    #[test]
    fn test_create_account_invalid() {
        let f = fixture();
        let unknown = uuid::Uuid::new_v4();

        for (new_account, want) in vec![
            (
                f.new_account(dec!(-1)),
                Error::InvalidInput("balance must not be negative, got -1".to_string()),
            ),
            (
                NewAccount {
                    packet: String::new(),
                    ..f.new_account(dec!(1))
                },
                Error::InvalidInput("Packet is required".to_string()),
            ),
            (
                NewAccount {
                    customer_id: unknown,
                    ..f.new_account(dec!(1))
                },
                Error::not_found(Resource::Customer, unknown),
            ),
            (
                NewAccount {
                    deposito_type_id: unknown,
                    ..f.new_account(dec!(1))
                },
                Error::not_found(Resource::DepositoType, unknown),
            ),
        ] {
            assert_eq!(Err(want), f.store.create_account(new_account));
        }
        assert!(f.store.list_accounts().unwrap().is_empty());
    }

    #[test]
    fn test_list_accounts_oldest_first() {
        let f = fixture();
        for created_at in vec!["2024-03-01 00:00", "2023-06-01 00:00"] {
            f.store
                .create_account(NewAccount {
                    created_at: Some(opened_at(created_at)),
                    ..f.new_account(dec!(1))
                })
                .unwrap();
        }

        let dates: Vec<_> = f
            .store
            .list_accounts()
            .unwrap()
            .into_iter()
            .map(|details| details.account.created_at)
            .collect();
        assert_eq!(
            vec![opened_at("2023-06-01 00:00"), opened_at("2024-03-01 00:00")],
            dates
        );
    }

    #[test]
    fn test_update_account() {
        let f = fixture();
        let account = f.store.create_account(f.new_account(dec!(10))).unwrap();
        let jane = f
            .store
            .create_customer(NewCustomer {
                name: "Jane Miller".to_string(),
            })
            .unwrap();

        let updated = f
            .store
            .update_account(
                account.id,
                AccountUpdate {
                    packet: Some("Premium".to_string()),
                    customer_id: Some(jane.id),
                },
            )
            .unwrap();

        assert_eq!("Premium", updated.packet);
        assert_eq!(jane.id, updated.customer_id);
        assert_eq!(account.balance, updated.balance);
        assert_eq!(account.deposito_type_id, updated.deposito_type_id);

        let unknown = uuid::Uuid::new_v4();
        assert_eq!(
            Err(Error::not_found(Resource::Customer, unknown)),
            f.store.update_account(
                account.id,
                AccountUpdate {
                    customer_id: Some(unknown),
                    ..Default::default()
                }
            )
        );
    }

    #[test]
    fn test_delete_account() {
        let f = fixture();
        let account = f.store.create_account(f.new_account(dec!(10))).unwrap();

        assert_eq!(Ok(()), f.store.delete_account(account.id));
        assert_eq!(
            Err(Error::not_found(Resource::Account, account.id)),
            f.store.delete_account(account.id)
        );
    }

    #[test]
    fn test_restore_account() {
        let f = fixture();
        let account = f.store.create_account(f.new_account(dec!(10))).unwrap();

        assert!(matches!(
            f.store.restore_account(account.clone()),
            Err(Error::Conflict(_))
        ));

        f.store.delete_account(account.id).unwrap();
        assert_eq!(Ok(account.clone()), f.store.restore_account(account.clone()));
        assert_eq!(Ok(account.clone()), f.store.get_account(account.id));
    }
}
