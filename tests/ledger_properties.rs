//! Property tests: every strategy behaves like a plain sequential ledger
//!
//! Random operation sequences are applied single-threaded to each strategy and
//! to a `Vec<u64>` model; results and balances must agree after every step.

use concurrent_ledger::{
    Ledger, LedgerError, OptimisticLedger, OrderedLockLedger, PollingLockLedger, ReadWriteLedger,
};
use proptest::prelude::*;

const ACCOUNTS: usize = 4;

#[derive(Debug, Clone)]
enum Op {
    Deposit(usize, u64),
    Withdraw(usize, u64),
    Transfer(usize, usize, u64),
}

/// Mostly small amounts, with an occasional one that overflows any credit
fn amount() -> impl Strategy<Value = u64> {
    prop_oneof![9 => 0u64..200, 1 => Just(u64::MAX)]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..ACCOUNTS, amount()).prop_map(|(a, n)| Op::Deposit(a, n)),
        (0..ACCOUNTS, amount()).prop_map(|(a, n)| Op::Withdraw(a, n)),
        (0..ACCOUNTS, 0..ACCOUNTS, amount()).prop_map(|(a, b, n)| Op::Transfer(a, b, n)),
    ]
}

/// Outcome class of one operation, independent of error details
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Applied,
    Insufficient,
    Overflow,
}

fn classify(result: Result<(), LedgerError>) -> Outcome {
    match result {
        Ok(()) => Outcome::Applied,
        Err(LedgerError::InsufficientFunds { .. }) => Outcome::Insufficient,
        Err(LedgerError::ArithmeticOverflow { .. }) => Outcome::Overflow,
        Err(other) => panic!("unexpected error in sequential use: {}", other),
    }
}

fn model_step(model: &mut [u64], op: &Op) -> Outcome {
    match *op {
        Op::Deposit(a, n) => match model[a].checked_add(n) {
            Some(balance) => {
                model[a] = balance;
                Outcome::Applied
            }
            None => Outcome::Overflow,
        },
        Op::Withdraw(a, n) => match model[a].checked_sub(n) {
            Some(balance) => {
                model[a] = balance;
                Outcome::Applied
            }
            None => Outcome::Insufficient,
        },
        Op::Transfer(a, b, _) if a == b => Outcome::Applied,
        Op::Transfer(a, b, n) => {
            let Some(from) = model[a].checked_sub(n) else {
                return Outcome::Insufficient;
            };
            let Some(to) = model[b].checked_add(n) else {
                return Outcome::Overflow;
            };
            model[a] = from;
            model[b] = to;
            Outcome::Applied
        }
    }
}

fn check_against_model<L: Ledger + Default>(ops: &[Op]) -> Result<(), TestCaseError> {
    let ledger = L::default();
    let accounts: Vec<_> = (0..ACCOUNTS).map(|_| ledger.create_account()).collect();
    let mut model = vec![0u64; ACCOUNTS];

    for op in ops {
        let actual = classify(match *op {
            Op::Deposit(a, n) => ledger.deposit(&accounts[a], n),
            Op::Withdraw(a, n) => ledger.withdraw(&accounts[a], n),
            Op::Transfer(a, b, n) => ledger.transfer(&accounts[a], &accounts[b], n),
        });
        let expected = model_step(&mut model, op);
        prop_assert_eq!(actual, expected, "op {:?}", op);

        let balances: Vec<u64> = accounts.iter().map(|a| ledger.balance(a)).collect();
        prop_assert_eq!(&balances, &model);

        let model_total = model.iter().try_fold(0u64, |sum, &b| sum.checked_add(b));
        match (ledger.total_funds(), model_total) {
            (Ok(total), Some(expected)) => prop_assert_eq!(total, expected),
            (Err(LedgerError::ArithmeticOverflow { .. }), None) => {}
            (actual, expected) => {
                prop_assert!(false, "total {:?}, model {:?}", actual, expected)
            }
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn test_ordered_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        check_against_model::<OrderedLockLedger>(&ops)?;
    }

    #[test]
    fn test_polling_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        check_against_model::<PollingLockLedger>(&ops)?;
    }

    #[test]
    fn test_read_write_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        check_against_model::<ReadWriteLedger>(&ops)?;
    }

    #[test]
    fn test_optimistic_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        check_against_model::<OptimisticLedger>(&ops)?;
    }
}
