//! Posting validation and idempotency decisions.
//!
//! A `Posting` is a fully validated unit of work for the Transaction Poster:
//! once constructed it is guaranteed to have at least two nonzero entry
//! lines summing to zero, all in the posting currency. The db layer persists
//! it atomically; nothing unbalanced can reach the database.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use telar_shared::types::{Currency, MinorAmount, TransactionId};

use super::account::AccountKey;
use super::error::LedgerError;

/// The business event a ledger transaction records.
///
/// Stored as (reference_type, reference_id), unique per pair: a business
/// event posts exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reference_type", content = "reference_id", rename_all = "snake_case")]
pub enum PostingReference {
    /// Capture of a paid checkout.
    Checkout(Uuid),
    /// Release of seller funds from pending to available.
    PendingRelease(Uuid),
    /// A requested payout locking available funds.
    Payout(Uuid),
    /// Settlement of a paid payout (clears payout_in_transit).
    PayoutSettlement(Uuid),
    /// Reversal of a failed payout (returns funds to available).
    PayoutFailure(Uuid),
    /// Refund of a paid checkout.
    Refund(Uuid),
    /// Manual reversal of a prior transaction.
    Reversal(Uuid),
}

impl PostingReference {
    /// The `reference_type` column value.
    #[must_use]
    pub const fn reference_type(self) -> &'static str {
        match self {
            Self::Checkout(_) => "checkout",
            Self::PendingRelease(_) => "pending_release",
            Self::Payout(_) => "payout",
            Self::PayoutSettlement(_) => "payout_settlement",
            Self::PayoutFailure(_) => "payout_failure",
            Self::Refund(_) => "refund",
            Self::Reversal(_) => "reversal",
        }
    }

    /// The `reference_id` column value.
    #[must_use]
    pub const fn reference_id(self) -> Uuid {
        match self {
            Self::Checkout(id)
            | Self::PendingRelease(id)
            | Self::Payout(id)
            | Self::PayoutSettlement(id)
            | Self::PayoutFailure(id)
            | Self::Refund(id)
            | Self::Reversal(id) => id,
        }
    }
}

/// One leg of a posting: a signed amount against an account key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryLine {
    /// The account this leg hits (resolved lazily by the Account Registry).
    pub account: AccountKey,
    /// Signed amount in minor units; never zero.
    pub amount_minor: MinorAmount,
    /// Opaque audit metadata stored on the entry row.
    pub metadata: serde_json::Value,
}

impl EntryLine {
    /// Creates an entry line with empty metadata.
    #[must_use]
    pub fn new(account: AccountKey, amount_minor: MinorAmount) -> Self {
        Self {
            account,
            amount_minor,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Attaches audit metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// A validated, balanced unit of work ready for atomic persistence.
#[derive(Debug, Clone)]
pub struct Posting {
    /// The business event this posting records.
    pub reference: PostingReference,
    /// Client-supplied replay token, globally unique.
    pub idempotency_key: String,
    /// Currency every entry is denominated in.
    pub currency: Currency,
    /// Human-readable description.
    pub description: Option<String>,
    /// The balanced entry lines (≥ 2, zero sum).
    entries: Vec<EntryLine>,
}

impl Posting {
    /// Validates and constructs a posting.
    ///
    /// Checks, in order:
    /// 1. at least 2 entries
    /// 2. no zero-amount entry
    /// 3. every entry's account currency matches the posting currency
    /// 4. amounts sum to exactly zero
    ///
    /// # Errors
    ///
    /// Returns the corresponding `LedgerError`; nothing invalid is ever
    /// constructed, so nothing invalid can be persisted.
    pub fn new(
        reference: PostingReference,
        idempotency_key: impl Into<String>,
        currency: Currency,
        description: Option<String>,
        entries: Vec<EntryLine>,
    ) -> Result<Self, LedgerError> {
        if entries.len() < 2 {
            return Err(LedgerError::InsufficientEntries);
        }

        let mut sum: i128 = 0;
        for entry in &entries {
            if entry.amount_minor == 0 {
                return Err(LedgerError::ZeroEntryAmount);
            }
            if entry.account.currency != currency {
                return Err(LedgerError::CurrencyMismatch {
                    entry: entry.account.currency.code().to_string(),
                    posting: currency.code().to_string(),
                });
            }
            sum += i128::from(entry.amount_minor);
        }

        if sum != 0 {
            // The sum of any number of i64 lines that pass the per-line checks
            // still fits i64 in practice; saturate rather than wrap for the
            // error payload.
            let sum = MinorAmount::try_from(sum).unwrap_or(MinorAmount::MAX);
            return Err(LedgerError::UnbalancedPosting { sum });
        }

        Ok(Self {
            reference,
            idempotency_key: idempotency_key.into(),
            currency,
            description,
            entries,
        })
    }

    /// The validated entry lines.
    #[must_use]
    pub fn entries(&self) -> &[EntryLine] {
        &self.entries
    }

    /// Builds the reversing posting for this one (amounts negated).
    ///
    /// Corrections are modeled as new reversing transactions; entries are
    /// append-only and never updated in place.
    ///
    /// # Errors
    ///
    /// Propagates validation errors, though a reversal of a valid posting is
    /// always valid.
    pub fn reversed(
        &self,
        original_transaction_id: TransactionId,
        idempotency_key: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        let entries = self
            .entries
            .iter()
            .map(|e| EntryLine {
                account: e.account,
                amount_minor: -e.amount_minor,
                metadata: e.metadata.clone(),
            })
            .collect();

        Self::new(
            PostingReference::Reversal(original_transaction_id.into_inner()),
            idempotency_key,
            self.currency,
            self.description.clone(),
            entries,
        )
    }
}

/// What an existing-transaction lookup means for a new posting attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyDecision {
    /// No prior transaction; insert fresh rows.
    Fresh,
    /// Same idempotency key already posted; return the stored id, write nothing.
    Replay(TransactionId),
}

/// Decides how a posting attempt relates to previously stored transactions.
///
/// `by_key` is the transaction already stored under this idempotency key (if
/// any); `by_reference` is the one stored for the same (reference_type,
/// reference_id) pair, with its key.
///
/// # Errors
///
/// Returns `DuplicateReference` when the reference already posted under a
/// different idempotency key; a business event must post exactly once.
pub fn decide_idempotency(
    reference: PostingReference,
    idempotency_key: &str,
    by_key: Option<TransactionId>,
    by_reference: Option<(TransactionId, &str)>,
) -> Result<IdempotencyDecision, LedgerError> {
    if let Some(existing) = by_key {
        return Ok(IdempotencyDecision::Replay(existing));
    }

    if let Some((_, existing_key)) = by_reference {
        if existing_key != idempotency_key {
            return Err(LedgerError::DuplicateReference {
                reference_type: reference.reference_type().to_string(),
                reference_id: reference.reference_id(),
            });
        }
    }

    Ok(IdempotencyDecision::Fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::account::{AccountKey, LedgerAccountType};
    use telar_shared::types::ShopId;

    fn platform(account_type: LedgerAccountType) -> AccountKey {
        AccountKey::platform(Currency::Cop, account_type)
    }

    fn shop(account_type: LedgerAccountType) -> AccountKey {
        AccountKey::shop(ShopId::new(), Currency::Cop, account_type)
    }

    fn checkout_ref() -> PostingReference {
        PostingReference::Checkout(Uuid::new_v4())
    }

    #[test]
    fn test_balanced_posting() {
        let posting = Posting::new(
            checkout_ref(),
            "key-1",
            Currency::Cop,
            Some("capture".into()),
            vec![
                EntryLine::new(platform(LedgerAccountType::Clearing), -105_000),
                EntryLine::new(shop(LedgerAccountType::Pending), 100_000),
                EntryLine::new(platform(LedgerAccountType::Revenue), 5_000),
            ],
        )
        .unwrap();

        assert_eq!(posting.entries().len(), 3);
    }

    #[test]
    fn test_single_entry_rejected() {
        let result = Posting::new(
            checkout_ref(),
            "key-1",
            Currency::Cop,
            None,
            vec![EntryLine::new(platform(LedgerAccountType::Clearing), -100)],
        );
        assert!(matches!(result, Err(LedgerError::InsufficientEntries)));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result = Posting::new(
            checkout_ref(),
            "key-1",
            Currency::Cop,
            None,
            vec![
                EntryLine::new(platform(LedgerAccountType::Clearing), 0),
                EntryLine::new(shop(LedgerAccountType::Pending), 0),
            ],
        );
        assert!(matches!(result, Err(LedgerError::ZeroEntryAmount)));
    }

    #[test]
    fn test_unbalanced_rejected() {
        let result = Posting::new(
            checkout_ref(),
            "key-1",
            Currency::Cop,
            None,
            vec![
                EntryLine::new(platform(LedgerAccountType::Clearing), -100),
                EntryLine::new(shop(LedgerAccountType::Pending), 99),
            ],
        );
        assert!(matches!(
            result,
            Err(LedgerError::UnbalancedPosting { sum: -1 })
        ));
    }

    #[test]
    fn test_currency_mismatch_rejected() {
        let result = Posting::new(
            checkout_ref(),
            "key-1",
            Currency::Cop,
            None,
            vec![
                EntryLine::new(platform(LedgerAccountType::Clearing), -100),
                EntryLine::new(
                    AccountKey::shop(ShopId::new(), Currency::Usd, LedgerAccountType::Pending),
                    100,
                ),
            ],
        );
        assert!(matches!(result, Err(LedgerError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_reversed_posting_negates_amounts() {
        let posting = Posting::new(
            checkout_ref(),
            "key-1",
            Currency::Cop,
            None,
            vec![
                EntryLine::new(platform(LedgerAccountType::Clearing), -500),
                EntryLine::new(shop(LedgerAccountType::Pending), 500),
            ],
        )
        .unwrap();

        let original_id = TransactionId::new();
        let reversed = posting.reversed(original_id, "key-2").unwrap();
        assert_eq!(
            reversed.reference,
            PostingReference::Reversal(original_id.into_inner())
        );
        assert_eq!(reversed.entries()[0].amount_minor, 500);
        assert_eq!(reversed.entries()[1].amount_minor, -500);
    }

    #[test]
    fn test_idempotency_fresh() {
        let decision = decide_idempotency(checkout_ref(), "key-1", None, None).unwrap();
        assert_eq!(decision, IdempotencyDecision::Fresh);
    }

    #[test]
    fn test_idempotency_replay() {
        let existing = TransactionId::new();
        let decision =
            decide_idempotency(checkout_ref(), "key-1", Some(existing), None).unwrap();
        assert_eq!(decision, IdempotencyDecision::Replay(existing));
    }

    #[test]
    fn test_idempotency_same_reference_same_key_is_fresh() {
        // The unique-key lookup missed but the reference row carries our own
        // key: treat as fresh and let the DB unique constraint arbitrate.
        let existing = TransactionId::new();
        let decision =
            decide_idempotency(checkout_ref(), "key-1", None, Some((existing, "key-1"))).unwrap();
        assert_eq!(decision, IdempotencyDecision::Fresh);
    }

    #[test]
    fn test_idempotency_duplicate_reference() {
        let reference = checkout_ref();
        let existing = TransactionId::new();
        let result =
            decide_idempotency(reference, "key-2", None, Some((existing, "key-1")));
        assert!(matches!(
            result,
            Err(LedgerError::DuplicateReference { .. })
        ));
    }

    #[test]
    fn test_reference_parts() {
        let id = Uuid::new_v4();
        assert_eq!(PostingReference::Checkout(id).reference_type(), "checkout");
        assert_eq!(PostingReference::Checkout(id).reference_id(), id);
        assert_eq!(
            PostingReference::PayoutSettlement(id).reference_type(),
            "payout_settlement"
        );
    }
}
