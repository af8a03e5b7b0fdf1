use super::{AccountStore, Customer, DepositoType, RateLookup};
use crate::error::Resource;
use crate::ledger::{
    account::Account,
    transaction::{NewTransaction, TransactionRecord},
    AccountId, CustomerId, DepositoTypeId, Rate,
};
use crate::Error;

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// An account together with its ledger. Both sit behind the same lock so a
/// balance update and its ledger entry are always committed together.
#[derive(Debug)]
pub(super) struct AccountEntry {
    pub account: Account,
    pub transactions: Vec<TransactionRecord>,
}

/// Keeps every record in memory.
///
/// Locks are always taken in the same order to stay clear of deadlocks:
/// customers, then deposito types, then the account map, then a single
/// account. Commits only hold the account map for reading, so commits on
/// different accounts run in parallel while commits on the same account queue
/// up on that account's mutex.
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub(super) customers: RwLock<HashMap<CustomerId, Customer>>,
    pub(super) deposito_types: RwLock<HashMap<DepositoTypeId, DepositoType>>,
    pub(super) accounts: RwLock<HashMap<AccountId, Mutex<AccountEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(what: &str) -> Error {
    tracing::error!("the {what} lock was poisoned by a panicking thread");
    Error::Store(format!("the {what} lock is poisoned"))
}

pub(super) fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>, Error> {
    lock.read().map_err(|_| poisoned(what))
}

pub(super) fn write<'a, T>(
    lock: &'a RwLock<T>,
    what: &str,
) -> Result<RwLockWriteGuard<'a, T>, Error> {
    lock.write().map_err(|_| poisoned(what))
}

pub(super) fn lock<'a>(entry: &'a Mutex<AccountEntry>) -> Result<MutexGuard<'a, AccountEntry>, Error> {
    entry.lock().map_err(|_| poisoned("account"))
}

/// Look up an account entry in an already locked account map.
pub(super) fn entry(
    accounts: &HashMap<AccountId, Mutex<AccountEntry>>,
    account_id: AccountId,
) -> Result<&Mutex<AccountEntry>, Error> {
    accounts
        .get(&account_id)
        .ok_or_else(|| Error::not_found(Resource::Account, account_id))
}

impl AccountStore for MemoryStore {
    fn get_account(&self, account_id: AccountId) -> Result<Account, Error> {
        let accounts = read(&self.accounts, "account map")?;
        let entry = lock(entry(&accounts, account_id)?)?;

        Ok(entry.account.clone())
    }

    fn commit<T>(
        &self,
        account_id: AccountId,
        work: impl FnOnce(&mut Account) -> Result<(NewTransaction, T), Error>,
    ) -> Result<(TransactionRecord, T), Error> {
        let accounts = read(&self.accounts, "account map")?;
        let mut entry = lock(entry(&accounts, account_id)?)?;

        let mut staged = entry.account.clone();
        let (transaction, output) = work(&mut staged)?;
        let record = transaction.into_record(account_id);

        entry.account = staged;
        entry.transactions.push(record.clone());

        Ok((record, output))
    }

    fn transactions(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>, Error> {
        let accounts = read(&self.accounts, "account map")?;
        let mut transactions = lock(entry(&accounts, account_id)?)?.transactions.clone();

        // Entries may be recorded with effective dates out of order. The sort
        // is stable, so entries sharing a date keep their insertion order.
        transactions.sort_by_key(|transaction| transaction.date);

        Ok(transactions)
    }
}

impl RateLookup for MemoryStore {
    fn yearly_return(&self, deposito_type_id: DepositoTypeId) -> Result<Rate, Error> {
        read(&self.deposito_types, "deposito type")?
            .get(&deposito_type_id)
            .map(|deposito_type| deposito_type.yearly_return)
            .ok_or_else(|| Error::not_found(Resource::DepositoType, deposito_type_id))
    }
}
