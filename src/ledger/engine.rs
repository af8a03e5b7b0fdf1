use super::{
    interest::InterestCalculation,
    transaction::{NewTransaction, TransactionRecord, Type},
    AccountId, Amount, BackdatePolicy,
};
use crate::store::{AccountStore, RateLookup};
use crate::Error;

use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;

/// A committed withdrawal, with how interest grew the balance beforehand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Withdrawal {
    pub transaction: TransactionRecord,
    pub calculation: InterestCalculation,
}

/// Engine applies deposits and withdrawals to the accounts of a store.
///
/// It holds no state of its own besides the store, so it can be cloned and
/// shared between threads freely. Operations on the same account are
/// serialized by the store; operations on different accounts run in parallel.
#[derive(Debug)]
pub struct Engine<S> {
    store: Arc<S>,
    backdate_policy: BackdatePolicy,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            backdate_policy: self.backdate_policy,
        }
    }
}

impl<S: AccountStore + RateLookup> Engine<S> {
    pub fn new(store: Arc<S>, backdate_policy: BackdatePolicy) -> Self {
        Self {
            store,
            backdate_policy,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add `amount` to the balance and record a deposit. No interest accrues.
    pub fn deposit(
        &self,
        account_id: AccountId,
        amount: Amount,
        date: NaiveDateTime,
    ) -> Result<TransactionRecord, Error> {
        let transaction = NewTransaction::new(Type::Deposit, amount, date)?;
        let amount = transaction.amount;

        let (record, ()) = self.store.commit(account_id, move |account| {
            account.apply_deposit(amount)?;
            Ok((transaction, ()))
        })?;
        tracing::info!(%account_id, %amount, transaction_id = %record.id, "deposit");

        Ok(record)
    }

    /// Accrue interest up to `date`, then remove `amount` and record a
    /// withdrawal.
    ///
    /// The withdrawal only goes through if `amount` is covered by the balance
    /// as it was before interest.
    pub fn withdraw(
        &self,
        account_id: AccountId,
        amount: Amount,
        date: NaiveDateTime,
    ) -> Result<Withdrawal, Error> {
        let transaction = NewTransaction::new(Type::Withdraw, amount, date)?;
        let amount = transaction.amount;

        // The deposito type of an account never changes, and looking its rate
        // up inside the commit would take the deposito type lock after the
        // account's.
        let account = self.store.get_account(account_id)?;
        let yearly_return = self.store.yearly_return(account.deposito_type_id)?;

        let backdate_policy = self.backdate_policy;
        let (record, calculation) = self.store.commit(account_id, move |account| {
            let calculation =
                account.apply_withdrawal(amount, date, yearly_return, backdate_policy)?;
            Ok((transaction, calculation))
        })?;
        tracing::debug!(%account_id, ?calculation, "interest accrued");
        tracing::info!(
            %account_id,
            %amount,
            months = calculation.months,
            interest = %calculation.interest(),
            transaction_id = %record.id,
            "withdrawal"
        );

        Ok(Withdrawal {
            transaction: record,
            calculation,
        })
    }

    /// The ledger of an account, ordered by effective date.
    pub fn transactions_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<TransactionRecord>, Error> {
        self.store.transactions(account_id)
    }
}
