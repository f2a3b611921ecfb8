//! Payout error types.

use thiserror::Error;
use uuid::Uuid;

use telar_shared::types::MinorAmount;

use crate::ledger::LedgerError;

/// Errors that can occur on payout operations.
#[derive(Debug, Error)]
pub enum PayoutError {
    /// Payout not found.
    #[error("Payout not found: {0}")]
    NotFound(Uuid),

    /// Payout amounts must be positive.
    #[error("Payout amount must be positive, got {0}")]
    InvalidAmount(MinorAmount),

    /// An idempotency key is required so retries can be deduplicated.
    #[error("Payout idempotency key must not be empty")]
    EmptyIdempotencyKey,

    /// The requested status edge is not part of the machine.
    #[error("Invalid payout transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// The underlying ledger posting failed. Carries `InsufficientBalance`
    /// when the shop's available balance cannot cover the request.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PayoutError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "PAYOUT_NOT_FOUND",
            Self::InvalidAmount(_) => "INVALID_PAYOUT_AMOUNT",
            Self::EmptyIdempotencyKey => "EMPTY_IDEMPOTENCY_KEY",
            Self::InvalidTransition { .. } => "INVALID_PAYOUT_TRANSITION",
            Self::Ledger(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidAmount(_) | Self::EmptyIdempotencyKey => 400,
            Self::InvalidTransition { .. } => 422,
            Self::Ledger(inner) => inner.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}
