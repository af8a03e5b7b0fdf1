use crate::ledger::{
    process::Outcome, round_money, transaction::Type, AccountId, Amount, TransactionId,
};
use crate::snapshot::AccountRow;
use crate::store::AccountDetails;

use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::mpsc::Receiver;

// A ledger entry, flattened for CSV. Months and interest are left empty for
// deposits, which don't accrue anything.
#[derive(Serialize)]
struct TransactionRow {
    #[serde(rename = "transaction")]
    transaction_id: TransactionId,

    #[serde(rename = "type")]
    tx_type: Type,

    #[serde(rename = "account")]
    account_id: AccountId,

    amount: Amount,
    date: NaiveDateTime,
    months: Option<i32>,
    interest: Option<Amount>,
}

impl TransactionRow {
    fn new(outcome: &Outcome) -> Self {
        let transaction = outcome.transaction();
        let (months, interest) = match outcome {
            Outcome::Deposit(_) => (None, None),
            Outcome::Withdrawal(withdrawal) => (
                Some(withdrawal.calculation.months),
                Some(round_money(withdrawal.calculation.interest())),
            ),
        };

        Self {
            transaction_id: transaction.id,
            tx_type: transaction.tx_type,
            account_id: transaction.account_id,
            amount: transaction.amount,
            date: transaction.date,
            months,
            interest,
        }
    }
}

// Writes the committed transactions to the given stream, as they come.
pub fn write_transactions(
    output_stream: impl std::io::Write,
    outcomes: Receiver<Outcome>,
) -> Result<usize, std::io::Error> {
    let mut writer = csv::Writer::from_writer(output_stream);
    let mut written = 0;

    for outcome in outcomes {
        writer.serialize(TransactionRow::new(&outcome))?;
        written += 1;
    }
    writer.flush()?;

    Ok(written)
}

// Writes the accounts in the snapshot layout, so the output can be loaded
// back as the next snapshot.
pub fn write_balances(
    output_stream: impl std::io::Write,
    accounts: &[AccountDetails],
) -> Result<(), std::io::Error> {
    let mut writer = csv::Writer::from_writer(output_stream);

    for details in accounts {
        writer.serialize(AccountRow::from(details))?;
    }
    writer.flush()?;

    Ok(())
}
