use crate::ledger::{
    calendar::whole_months_between, interest::InterestCalculation, round_money, Amount,
    BackdatePolicy, Rate,
};
use crate::Error;

use super::account::Account;
use chrono::NaiveDateTime;

impl Account {
    /// Accrue interest on the balance up to `date`, then deduct `amount`.
    ///
    /// Sufficiency is checked against the balance *before* interest: accrued
    /// interest is added to the stored balance but cannot fund the withdrawal
    /// that accrues it. On error the account is left untouched.
    pub(crate) fn apply_withdrawal(
        &mut self,
        amount: Amount,
        date: NaiveDateTime,
        yearly_return: Rate,
        backdate_policy: BackdatePolicy,
    ) -> Result<InterestCalculation, Error> {
        let months = whole_months_between(self.created_at, date)?;
        if months < 0 {
            match backdate_policy {
                BackdatePolicy::Reject => {
                    return Err(Error::InvalidInput(format!(
                        "withdrawal dated {date} precedes the account opening on {}",
                        self.created_at
                    )));
                }
                BackdatePolicy::Accrue => tracing::warn!(
                    account_id = %self.id,
                    months,
                    "withdrawal predates the account opening, accruing negative interest"
                ),
            }
        }

        let starting_balance = self.balance.amount();
        if amount > starting_balance {
            return Err(Error::InsufficientFunds {
                balance: starting_balance,
                requested: amount,
            });
        }

        let calculation = InterestCalculation::new(starting_balance, yearly_return, months)?;

        let new_balance = calculation
            .ending_balance
            .checked_sub(amount)
            .ok_or(Error::Overflow("new balance"))?;

        // Only negative interest can get here: the balance must still never
        // go below zero.
        if new_balance < Amount::ZERO && !round_money(new_balance).is_zero() {
            return Err(Error::InsufficientFunds {
                balance: starting_balance,
                requested: amount,
            });
        }

        self.balance.set(new_balance)?;

        Ok(calculation)
    }
}
