//! Property-based tests for posting validation.
//!
//! Properties covered:
//! - a posting built from any balanced, nonzero entry set validates
//! - any entry set with a nonzero sum is rejected and never constructed
//! - reversal preserves balance and negates every leg

use proptest::prelude::*;
use uuid::Uuid;

use telar_shared::types::{Currency, ShopId, TransactionId};

use super::account::{AccountKey, LedgerAccountType};
use super::error::LedgerError;
use super::posting::{EntryLine, Posting, PostingReference};

fn any_account_type() -> impl Strategy<Value = LedgerAccountType> {
    prop_oneof![
        Just(LedgerAccountType::Clearing),
        Just(LedgerAccountType::Revenue),
        Just(LedgerAccountType::Taxes),
        Just(LedgerAccountType::Pending),
        Just(LedgerAccountType::Available),
        Just(LedgerAccountType::PayoutInTransit),
    ]
}

fn any_account() -> impl Strategy<Value = AccountKey> {
    (any_account_type(), any::<bool>()).prop_map(|(account_type, platform)| {
        if platform {
            AccountKey::platform(Currency::Cop, account_type)
        } else {
            AccountKey::shop(ShopId::new(), Currency::Cop, account_type)
        }
    })
}

/// Nonzero amounts small enough that any test-sized sum stays in range.
fn nonzero_amount() -> impl Strategy<Value = i64> {
    (1i64..1_000_000_000).prop_flat_map(|n| prop_oneof![Just(n), Just(-n)])
}

/// A balanced entry set: arbitrary legs plus one synthesized counter-leg.
fn balanced_entries() -> impl Strategy<Value = Vec<EntryLine>> {
    (
        prop::collection::vec((any_account(), nonzero_amount()), 1..8),
        any_account(),
    )
        .prop_filter_map("counter-leg must be nonzero", |(legs, counter_account)| {
            let sum: i64 = legs.iter().map(|(_, amount)| amount).sum();
            if sum == 0 {
                return None;
            }
            let mut entries: Vec<EntryLine> = legs
                .into_iter()
                .map(|(account, amount)| EntryLine::new(account, amount))
                .collect();
            entries.push(EntryLine::new(counter_account, -sum));
            Some(entries)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Any balanced set of ≥2 nonzero entries constructs a valid posting.
    #[test]
    fn prop_balanced_entries_validate(entries in balanced_entries()) {
        let posting = Posting::new(
            PostingReference::Checkout(Uuid::new_v4()),
            "key",
            Currency::Cop,
            None,
            entries.clone(),
        );
        prop_assert!(posting.is_ok());

        let posting = posting.unwrap();
        let sum: i64 = posting.entries().iter().map(|e| e.amount_minor).sum();
        prop_assert_eq!(sum, 0, "constructed posting must sum to zero");
        prop_assert_eq!(posting.entries().len(), entries.len());
    }

    /// Skewing any single leg of a balanced set breaks the invariant.
    #[test]
    fn prop_skewed_entries_rejected(
        entries in balanced_entries(),
        skew in 1i64..1_000_000,
    ) {
        let mut entries = entries;
        entries[0].amount_minor += skew;
        // Skipping the rare case where the skew zeroes the leg out:
        // that trips ZeroEntryAmount first, which is also a rejection.
        let result = Posting::new(
            PostingReference::Checkout(Uuid::new_v4()),
            "key",
            Currency::Cop,
            None,
            entries,
        );
        prop_assert!(result.is_err());
    }

    /// A reversal negates every leg and still balances.
    #[test]
    fn prop_reversal_negates_and_balances(entries in balanced_entries()) {
        let posting = Posting::new(
            PostingReference::Payout(Uuid::new_v4()),
            "key",
            Currency::Cop,
            None,
            entries,
        )
        .unwrap();

        let reversed = posting.reversed(TransactionId::new(), "key-reversal").unwrap();
        prop_assert_eq!(reversed.entries().len(), posting.entries().len());
        for (original, flipped) in posting.entries().iter().zip(reversed.entries()) {
            prop_assert_eq!(flipped.amount_minor, -original.amount_minor);
            prop_assert_eq!(flipped.account, original.account);
        }
    }

    /// Fewer than two entries never validates, balanced or not.
    #[test]
    fn prop_single_entry_always_rejected(account in any_account(), amount in nonzero_amount()) {
        let result = Posting::new(
            PostingReference::Checkout(Uuid::new_v4()),
            "key",
            Currency::Cop,
            None,
            vec![EntryLine::new(account, amount)],
        );
        prop_assert!(matches!(result, Err(LedgerError::InsufficientEntries)));
    }
}
