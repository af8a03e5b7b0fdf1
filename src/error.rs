use crate::ledger::Amount;

use std::fmt;

/// The kinds of records the store keeps, used to describe what was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Account,
    Customer,
    DepositoType,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account => write!(f, "Account"),
            Self::Customer => write!(f, "Customer"),
            Self::DepositoType => write!(f, "Deposito Type"),
        }
    }
}

/// The errors that may occur while keeping accounts and their ledger.
///
/// Every variant is detected before anything is committed to the store, so a
/// caller receiving an error can assume the operation did not happen.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The referenced account, customer or deposito type does not exist.
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: Resource, id: String },

    /// The caller supplied a value that can never be valid, e.g. a
    /// non-positive amount, a malformed date or an out-of-range rate.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The withdrawal amount exceeds the balance before interest.
    #[error("insufficient balance: current balance {balance}, requested {requested}")]
    InsufficientFunds { balance: Amount, requested: Amount },

    /// The operation clashes with existing records, e.g. a duplicate deposito
    /// type name or deleting an account that still has ledger entries.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Decimal or calendar arithmetic went out of range.
    #[error("arithmetic overflow while computing the {0}")]
    Overflow(&'static str),

    /// The store itself failed, e.g. a lock was poisoned by a panicking
    /// thread. The error string should only be logged.
    #[error("the account store failed: {0}")]
    Store(String),
}

impl Error {
    pub(crate) fn not_found(resource: Resource, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
