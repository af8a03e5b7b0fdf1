use super::{round_money, AccountId, Amount, TransactionId};
use crate::Error;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The direction of a ledger entry. Amounts are always positive, the type
/// carries the sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Deposit, // Add the amount to the balance.

    // Accrue interest on the balance, then remove the amount.
    #[serde(alias = "withdrawal")]
    Withdraw,
}

/// A ledger entry that has not been committed yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub tx_type: Type,
    pub amount: Amount,
    pub date: NaiveDateTime,
}

impl NewTransaction {
    // The new() function ensures amounts are stored with cent precision, and
    // that nothing smaller than a cent makes it to the ledger.
    pub fn new(tx_type: Type, raw_amount: Amount, date: NaiveDateTime) -> Result<Self, Error> {
        let amount = round_money(raw_amount);
        if amount <= Amount::ZERO {
            return Err(Error::InvalidInput(format!(
                "amount must be at least 0.01 once rounded to cents, got {raw_amount}"
            )));
        }

        Ok(Self {
            tx_type,
            amount,
            date,
        })
    }

    /// Give the entry its identity once the store commits it.
    pub(crate) fn into_record(self, account_id: AccountId) -> TransactionRecord {
        TransactionRecord {
            id: uuid::Uuid::new_v4(),
            tx_type: self.tx_type,
            amount: self.amount,
            date: self.date,
            account_id,
        }
    }
}

/// An immutable ledger entry.
///
/// The ledger only records principal movements: interest accrued by a
/// withdrawal is absorbed into the balance without a line of its own, so
/// summing entries does not reproduce the balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: TransactionId,

    #[serde(rename = "type")]
    pub tx_type: Type,

    pub amount: Amount,
    pub date: NaiveDateTime,
    pub account_id: AccountId,
}
