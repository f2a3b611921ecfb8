//! Ledger error types for posting validation and balance checks.

use thiserror::Error;
use uuid::Uuid;

use telar_shared::types::MinorAmount;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Posting Validation ==========
    /// A posting must have at least 2 entry lines.
    #[error("Posting must have at least 2 entries")]
    InsufficientEntries,

    /// Entry amounts must sum to zero across a posting.
    #[error("Posting is not balanced: entries sum to {sum}")]
    UnbalancedPosting {
        /// The nonzero sum of entry amounts in minor units.
        sum: MinorAmount,
    },

    /// Entry amounts must be nonzero.
    #[error("Entry amount cannot be zero")]
    ZeroEntryAmount,

    /// All entries in a posting must be denominated in the posting currency.
    #[error("Entry currency {entry} does not match posting currency {posting}")]
    CurrencyMismatch {
        /// The entry's account currency code.
        entry: String,
        /// The posting's currency code.
        posting: String,
    },

    // ========== Account Errors ==========
    /// Platform accounts carry no owner id; shop accounts require one.
    #[error("Invalid owner kind: {0}")]
    InvalidOwnerKind(String),

    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    // ========== Idempotency / Uniqueness ==========
    /// A business event may post exactly once; a second posting for the same
    /// reference with a different idempotency key is a bug upstream.
    #[error(
        "A transaction already exists for {reference_type}/{reference_id} with a different idempotency key"
    )]
    DuplicateReference {
        /// The reference type of the conflicting posting.
        reference_type: String,
        /// The reference id of the conflicting posting.
        reference_id: Uuid,
    },

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    // ========== Balance Errors ==========
    /// Requested amount exceeds the account's derived balance.
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        /// Amount requested, minor units.
        requested: MinorAmount,
        /// Balance available, minor units.
        available: MinorAmount,
    },

    // ========== Concurrency ==========
    /// Concurrent modification detected; the caller should retry.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    // ========== Infrastructure ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::UnbalancedPosting { .. } => "UNBALANCED_POSTING",
            Self::ZeroEntryAmount => "ZERO_ENTRY_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InvalidOwnerKind(_) => "INVALID_OWNER_KIND",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateReference { .. } => "DUPLICATE_REFERENCE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::ConcurrentModification => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InsufficientEntries
            | Self::ZeroEntryAmount
            | Self::CurrencyMismatch { .. }
            | Self::InvalidOwnerKind(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TransactionNotFound(_) => 404,

            // 409 Conflict - uniqueness / concurrency
            Self::DuplicateReference { .. } | Self::ConcurrentModification => 409,

            // 422 Unprocessable - invariant violations
            Self::UnbalancedPosting { .. } | Self::InsufficientBalance { .. } => 422,

            // 500 Internal Server Error
            Self::Database(_) => 500,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InsufficientEntries.error_code(),
            "INSUFFICIENT_ENTRIES"
        );
        assert_eq!(
            LedgerError::UnbalancedPosting { sum: 5 }.error_code(),
            "UNBALANCED_POSTING"
        );
        assert_eq!(
            LedgerError::InsufficientBalance {
                requested: 100,
                available: 50,
            }
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::ZeroEntryAmount.http_status_code(), 400);
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::DuplicateReference {
                reference_type: "checkout".into(),
                reference_id: Uuid::nil(),
            }
            .http_status_code(),
            409
        );
        assert_eq!(
            LedgerError::UnbalancedPosting { sum: -1 }.http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::Database("boom".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_retryable_errors() {
        assert!(LedgerError::ConcurrentModification.is_retryable());
        assert!(!LedgerError::InsufficientEntries.is_retryable());
        assert!(
            !LedgerError::DuplicateReference {
                reference_type: "payout".into(),
                reference_id: Uuid::nil(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::UnbalancedPosting { sum: 250 };
        assert_eq!(err.to_string(), "Posting is not balanced: entries sum to 250");

        let err = LedgerError::InsufficientBalance {
            requested: 100_000,
            available: 25_000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: requested 100000, available 25000"
        );
    }
}
