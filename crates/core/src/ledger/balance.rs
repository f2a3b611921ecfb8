//! Account balance aggregation.
//!
//! Balances are never stored as mutable columns. A balance is always the sum
//! of the account's entries; the entry log is append-only, so the derived
//! value cannot drift from the truth. Balance queries lean on the
//! `idx_ledger_entries_account` covering index.

use serde::{Deserialize, Serialize};

use telar_shared::types::{AccountId, Currency, MinorAmount};

use super::error::LedgerError;

/// A derived account balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account.
    pub account_id: AccountId,
    /// Account currency.
    pub currency: Currency,
    /// Sum of all entry amounts, minor units.
    pub balance_minor: MinorAmount,
    /// Number of entries summed.
    pub entry_count: u64,
}

impl AccountBalance {
    /// Sums a stream of signed entry amounts into a balance.
    #[must_use]
    pub fn from_entries<I>(account_id: AccountId, currency: Currency, amounts: I) -> Self
    where
        I: IntoIterator<Item = MinorAmount>,
    {
        let mut balance_minor: MinorAmount = 0;
        let mut entry_count = 0u64;
        for amount in amounts {
            balance_minor += amount;
            entry_count += 1;
        }
        Self {
            account_id,
            currency,
            balance_minor,
            entry_count,
        }
    }
}

/// Checks that an account can cover a withdrawal.
///
/// # Errors
///
/// Returns `InsufficientBalance` when `requested` exceeds `available`.
/// The caller must hold this check and the subsequent posting inside one
/// database transaction, or two concurrent withdrawals can double-spend.
pub const fn check_available(
    available: MinorAmount,
    requested: MinorAmount,
) -> Result<(), LedgerError> {
    if requested > available {
        return Err(LedgerError::InsufficientBalance {
            requested,
            available,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_from_entries() {
        let balance = AccountBalance::from_entries(
            AccountId::new(),
            Currency::Cop,
            vec![100_000, -25_000, 5_000],
        );
        assert_eq!(balance.balance_minor, 80_000);
        assert_eq!(balance.entry_count, 3);
    }

    #[test]
    fn test_balance_empty_is_zero() {
        let balance =
            AccountBalance::from_entries(AccountId::new(), Currency::Cop, std::iter::empty());
        assert_eq!(balance.balance_minor, 0);
        assert_eq!(balance.entry_count, 0);
    }

    #[test]
    fn test_check_available_ok() {
        assert!(check_available(100_000, 100_000).is_ok());
        assert!(check_available(100_000, 1).is_ok());
    }

    #[test]
    fn test_check_available_insufficient() {
        let result = check_available(50_000, 100_000);
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientBalance {
                requested: 100_000,
                available: 50_000,
            })
        ));
    }
}
