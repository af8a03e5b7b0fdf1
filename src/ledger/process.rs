use super::engine::{Engine, Withdrawal};
use super::transaction::{TransactionRecord, Type};
use super::{AccountId, Amount};
use crate::store::{AccountStore, RateLookup};
use crate::Error;

use chrono::NaiveDateTime;
use std::sync::mpsc::{self, Receiver, Sender};

/// A request to move money on an account, as read from a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub tx_type: Type,
    pub account_id: AccountId,
    pub amount: Amount,
    pub date: NaiveDateTime,
}

/// What a command committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Deposit(TransactionRecord),
    Withdrawal(Withdrawal),
}

impl Outcome {
    pub fn transaction(&self) -> &TransactionRecord {
        match self {
            Self::Deposit(transaction) => transaction,
            Self::Withdrawal(withdrawal) => &withdrawal.transaction,
        }
    }
}

/// A command the engine refused, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub command: Command,
    pub error: Error,
}

fn apply<S: AccountStore + RateLookup>(engine: &Engine<S>, command: &Command) -> Result<Outcome, Error> {
    match command.tx_type {
        Type::Deposit => engine
            .deposit(command.account_id, command.amount, command.date)
            .map(Outcome::Deposit),
        Type::Withdraw => engine
            .withdraw(command.account_id, command.amount, command.date)
            .map(Outcome::Withdrawal),
    }
}

/// Apply a stream of commands with `workers` threads.
///
/// Commands are sharded by account: every command for a given account goes to
/// the same worker, so they are applied in the order they were received, while
/// distinct accounts are processed in parallel. Committed outcomes and
/// rejected commands are streamed back as they happen; both channels close
/// once every command has been applied.
pub fn process<S>(
    engine: Engine<S>,
    commands: Receiver<Command>,
    workers: usize,
) -> (Receiver<Outcome>, Receiver<Rejected>)
where
    S: AccountStore + RateLookup + 'static,
{
    let (outcome_tx, outcome_rx) = mpsc::channel();
    let (rejected_tx, rejected_rx) = mpsc::channel();

    let shards: Vec<Sender<Command>> = (0..workers.max(1))
        .map(|_| {
            let (shard_tx, shard_rx) = mpsc::channel::<Command>();
            let engine = engine.clone();
            let outcome_tx: Sender<Outcome> = outcome_tx.clone();
            let rejected_tx: Sender<Rejected> = rejected_tx.clone();

            std::thread::spawn(move || {
                for command in shard_rx {
                    let sent = match apply(&engine, &command) {
                        Ok(outcome) => outcome_tx.send(outcome).is_ok(),
                        Err(error) => rejected_tx.send(Rejected { command, error }).is_ok(),
                    };
                    // Nobody is listening anymore, e.g. the output failed.
                    if !sent {
                        tracing::debug!("result receiver disconnected, stopping worker");
                        return;
                    }
                }
            });

            shard_tx
        })
        .collect();

    // Dispatching on a thread of its own lets the caller drain the results
    // while commands are still coming in.
    std::thread::spawn(move || {
        let shard_count = shards.len() as u128;
        for command in commands {
            let shard = (command.account_id.as_u128() % shard_count) as usize;
            if shards[shard].send(command).is_err() {
                tracing::debug!(shard, "worker stopped, no longer dispatching commands");
                return;
            }
        }
    });

    (outcome_rx, rejected_rx)
}

#[cfg(test)]
mod process_tests {
    use super::{process, Command, Outcome};
    use crate::ledger::account::account::test_utils::opened_at;
    use crate::ledger::engine::Engine;
    use crate::ledger::transaction::Type;
    use crate::ledger::BackdatePolicy;
    use crate::store::{AccountStore, MemoryStore, NewAccount, NewCustomer, NewDepositoType};
    use crate::Error;

    use rust_decimal_macros::dec;
    use std::sync::{mpsc, Arc};

    fn engine_with_accounts(count: usize) -> (Engine<MemoryStore>, Vec<uuid::Uuid>) {
        let store = MemoryStore::new();
        let customer = store
            .create_customer(NewCustomer {
                name: "John Miller".to_string(),
            })
            .unwrap();
        let flat = store
            .create_deposito_type(NewDepositoType {
                name: "Flat".to_string(),
                yearly_return: dec!(0),
            })
            .unwrap();
        let accounts = (0..count)
            .map(|_| {
                store
                    .create_account(NewAccount {
                        packet: "Standard".to_string(),
                        balance: dec!(0),
                        customer_id: customer.id,
                        deposito_type_id: flat.id,
                        created_at: Some(opened_at("2024-01-01 00:00")),
                    })
                    .unwrap()
                    .id
            })
            .collect();

        (Engine::new(Arc::new(store), BackdatePolicy::Accrue), accounts)
    }

    fn command(tx_type: Type, account_id: uuid::Uuid, amount: rust_decimal::Decimal) -> Command {
        Command {
            tx_type,
            account_id,
            amount,
            date: opened_at("2024-02-01 00:00"),
        }
    }

    #[test]
    fn test_process() {
        let (engine, accounts) = engine_with_accounts(3);
        let (commands_tx, commands) = mpsc::channel();
        for account_id in &accounts {
            commands_tx.send(command(Type::Deposit, *account_id, dec!(10))).unwrap();
            commands_tx.send(command(Type::Withdraw, *account_id, dec!(4))).unwrap();
        }
        drop(commands_tx);

        let (outcomes, rejected) = process(engine.clone(), commands, 2);

        let outcomes: Vec<Outcome> = outcomes.iter().collect();
        assert_eq!(6, outcomes.len());
        assert_eq!(0, rejected.iter().count());
        for account_id in &accounts {
            assert_eq!(
                dec!(6),
                engine.store().get_account(*account_id).unwrap().balance.amount()
            );
        }
    }

    #[test]
    // Commands for the same account are applied in the order they came in, so
    // a withdrawal following the deposit that funds it always succeeds.
    fn test_process_keeps_account_order() {
        let (engine, accounts) = engine_with_accounts(1);
        let account_id = accounts[0];
        let (commands_tx, commands) = mpsc::channel();
        for _ in 0..100 {
            commands_tx.send(command(Type::Deposit, account_id, dec!(1))).unwrap();
            commands_tx.send(command(Type::Withdraw, account_id, dec!(1))).unwrap();
        }
        drop(commands_tx);

        let (outcomes, rejected) = process(engine.clone(), commands, 8);

        let types: Vec<Type> = outcomes
            .iter()
            .map(|outcome| outcome.transaction().tx_type)
            .collect();
        assert_eq!(200, types.len());
        assert!(types
            .chunks(2)
            .all(|pair| pair == [Type::Deposit, Type::Withdraw]));
        assert_eq!(0, rejected.iter().count());
    }

    #[test]
    fn test_process_rejected() {
        let (engine, accounts) = engine_with_accounts(1);
        let unknown = uuid::Uuid::new_v4();
        let (commands_tx, commands) = mpsc::channel();
        for cmd in vec![
            command(Type::Withdraw, accounts[0], dec!(1)),
            command(Type::Deposit, unknown, dec!(1)),
            command(Type::Deposit, accounts[0], dec!(-1)),
        ] {
            commands_tx.send(cmd).unwrap();
        }
        drop(commands_tx);

        // A single worker makes the order of rejections deterministic.
        let (outcomes, rejected) = process(engine, commands, 1);

        assert_eq!(0, outcomes.iter().count());
        let errors: Vec<Error> = rejected.iter().map(|rejected| rejected.error).collect();
        assert_eq!(3, errors.len());
        assert!(matches!(errors[0], Error::InsufficientFunds { .. }));
        assert!(matches!(errors[1], Error::NotFound { .. }));
        assert!(matches!(errors[2], Error::InvalidInput(_)));
    }
}
