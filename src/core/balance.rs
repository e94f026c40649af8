//! Balance arithmetic shared by every strategy
//!
//! All functions are pure: they compute new balances and leave committing
//! them to the caller, which holds the relevant guards. A failed computation
//! therefore never leaves a partial mutation behind.

use crate::types::{AccountId, Amount, LedgerError};

/// Balance after removing `amount`
///
/// # Errors
///
/// `InsufficientFunds` when `balance < amount`.
pub fn debited(account: AccountId, balance: Amount, amount: Amount) -> Result<Amount, LedgerError> {
    balance
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::insufficient_funds(account, balance, amount))
}

/// Balance after adding `amount`
///
/// # Errors
///
/// `ArithmeticOverflow` when the result does not fit in [`Amount`].
pub fn credited(balance: Amount, amount: Amount) -> Result<Amount, LedgerError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::arithmetic_overflow("credit"))
}

/// New `(from, to)` balances for a transfer of `amount`
///
/// Both legs are computed before either is committed.
pub fn transferred(
    from: (AccountId, Amount),
    to: Amount,
    amount: Amount,
) -> Result<(Amount, Amount), LedgerError> {
    let (from_id, from_balance) = from;
    let from_balance = debited(from_id, from_balance, amount)?;
    let to_balance = credited(to, amount)?;
    Ok((from_balance, to_balance))
}

/// Sum of `balances` without wrapping
pub fn checked_total<I>(balances: I) -> Result<Amount, LedgerError>
where
    I: IntoIterator<Item = Amount>,
{
    balances
        .into_iter()
        .try_fold(0 as Amount, |total, balance| total.checked_add(balance))
        .ok_or_else(|| LedgerError::arithmetic_overflow("total_funds"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LedgerId;
    use rstest::rstest;

    fn id() -> AccountId {
        AccountId::new(LedgerId(0), 0)
    }

    #[rstest]
    #[case(10, 3, Some(7))]
    #[case(5, 5, Some(0))]
    #[case(5, 0, Some(5))]
    #[case(2, 3, None)]
    fn test_debited(#[case] balance: Amount, #[case] amount: Amount, #[case] expected: Option<Amount>) {
        match (debited(id(), balance, amount), expected) {
            (Ok(actual), Some(expected)) => assert_eq!(actual, expected),
            (Err(error), None) => {
                assert_eq!(error, LedgerError::insufficient_funds(id(), balance, amount))
            }
            (result, expected) => panic!("Expected {:?}, got {:?}", expected, result),
        }
    }

    #[test]
    fn test_credited_overflow() {
        assert_eq!(credited(1, 2), Ok(3));
        assert_eq!(
            credited(Amount::MAX, 1),
            Err(LedgerError::arithmetic_overflow("credit"))
        );
    }

    #[test]
    fn test_transferred_checks_both_legs() {
        assert_eq!(transferred((id(), 10), 0, 4), Ok((6, 4)));
        assert!(matches!(
            transferred((id(), 1), 0, 4),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        // the debit alone would succeed; the credit overflows
        assert!(matches!(
            transferred((id(), 10), Amount::MAX, 4),
            Err(LedgerError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_checked_total() {
        assert_eq!(checked_total(Vec::new()), Ok(0));
        assert_eq!(checked_total([1, 2, 3]), Ok(6));
        assert!(checked_total([Amount::MAX, 1]).is_err());
    }
}
