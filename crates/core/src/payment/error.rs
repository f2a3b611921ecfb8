//! Payment error types.

use thiserror::Error;
use uuid::Uuid;

use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::ledger::LedgerError;

/// Errors that can occur while tracking payment intents and attempts.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Payment intent not found.
    #[error("Payment intent not found: {0}")]
    IntentNotFound(Uuid),

    /// Payment attempt not found.
    #[error("Payment attempt not found: {0}")]
    AttemptNotFound(Uuid),

    /// Payment provider not found or inactive.
    #[error("Payment provider not found: {0}")]
    ProviderNotFound(String),

    /// The requested status edge is not part of the machine.
    #[error("Invalid payment transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// An attempt with this idempotency key already exists.
    #[error("Duplicate attempt idempotency key: {0}")]
    DuplicateIdempotencyKey(String),

    /// No new attempts may start once the intent is terminal.
    #[error("Payment intent {intent_id} is in terminal status '{status}'")]
    IntentTerminal {
        /// The intent.
        intent_id: Uuid,
        /// Its current status.
        status: &'static str,
    },

    /// The checkout tied to the intent rejected a transition.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The cart tied to the checkout rejected a transition.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// The capture posting failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PaymentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::IntentNotFound(_) => "PAYMENT_INTENT_NOT_FOUND",
            Self::AttemptNotFound(_) => "PAYMENT_ATTEMPT_NOT_FOUND",
            Self::ProviderNotFound(_) => "PAYMENT_PROVIDER_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_PAYMENT_TRANSITION",
            Self::DuplicateIdempotencyKey(_) => "DUPLICATE_IDEMPOTENCY_KEY",
            Self::IntentTerminal { .. } => "PAYMENT_INTENT_TERMINAL",
            Self::Checkout(inner) => inner.error_code(),
            Self::Cart(inner) => inner.error_code(),
            Self::Ledger(inner) => inner.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::IntentNotFound(_) | Self::AttemptNotFound(_) | Self::ProviderNotFound(_) => 404,
            Self::InvalidTransition { .. } | Self::IntentTerminal { .. } => 422,
            Self::DuplicateIdempotencyKey(_) => 409,
            Self::Checkout(inner) => inner.http_status_code(),
            Self::Cart(inner) => inner.http_status_code(),
            Self::Ledger(inner) => inner.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Checkout(inner) => inner.is_retryable(),
            Self::Cart(inner) => inner.is_retryable(),
            Self::Ledger(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}
