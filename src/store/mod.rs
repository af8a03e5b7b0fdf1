//! Persistence collaborators of the engine, and the in-memory back office.
//!
//! The engine only sees the two traits below. [MemoryStore] implements them
//! and additionally keeps the customer, deposito type and account records the
//! back office manages.

pub mod accounts;
pub mod customers;
pub mod deposito_types;
mod memory;

pub use accounts::{AccountDetails, AccountUpdate, NewAccount};
pub use customers::{Customer, CustomerUpdate, NewCustomer};
pub use deposito_types::{DepositoType, DepositoTypeUpdate, NewDepositoType};
pub use memory::MemoryStore;

use crate::ledger::{
    account::Account,
    transaction::{NewTransaction, TransactionRecord},
    AccountId, DepositoTypeId, Rate,
};
use crate::Error;

/// Where accounts and their ledger live.
pub trait AccountStore: Send + Sync {
    /// Get a snapshot of an account.
    fn get_account(&self, account_id: AccountId) -> Result<Account, Error>;

    /// Apply a unit of work to an account, atomically.
    ///
    /// `work` receives a staged copy of the account while the account is
    /// locked against concurrent commits. When it succeeds, the staged balance
    /// and the ledger entry it returns are committed together; when it fails,
    /// nothing is.
    fn commit<T>(
        &self,
        account_id: AccountId,
        work: impl FnOnce(&mut Account) -> Result<(NewTransaction, T), Error>,
    ) -> Result<(TransactionRecord, T), Error>;

    /// List the ledger entries of an account, ordered by effective date.
    fn transactions(&self, account_id: AccountId) -> Result<Vec<TransactionRecord>, Error>;
}

/// Where the yearly return of each deposito type is looked up.
pub trait RateLookup: Send + Sync {
    fn yearly_return(&self, deposito_type_id: DepositoTypeId) -> Result<Rate, Error>;
}

const MAX_NAME_LENGTH: usize = 255;

/// Names and packets are required and at most 255 characters long.
pub(crate) fn validate_name(field: &str, value: &str) -> Result<(), Error> {
    let length = value.chars().count();
    if length == 0 {
        return Err(Error::InvalidInput(format!("{field} is required")));
    }
    if length > MAX_NAME_LENGTH {
        return Err(Error::InvalidInput(format!("{field} is too long")));
    }

    Ok(())
}
