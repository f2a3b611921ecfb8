//! Pricing error types.

use thiserror::Error;
use uuid::Uuid;

use telar_shared::types::MinorAmount;

/// Errors that can occur during price resolution and rotation.
#[derive(Debug, Error)]
pub enum PricingError {
    /// No open price exists for the requested key. Distinct from an
    /// invariant violation: the caller must create a price before retrying.
    #[error("No active price for product {product_id} in context {context} ({currency})")]
    NoActivePrice {
        /// The product.
        product_id: Uuid,
        /// Context discriminant the lookup ran in.
        context: String,
        /// Requested currency code.
        currency: String,
    },

    /// More than one open row matched; the partial unique index has been
    /// bypassed and the data needs repair.
    #[error("Multiple open prices for product {product_id}; data integrity violated")]
    ConflictingOpenPrices {
        /// The product.
        product_id: Uuid,
    },

    /// Prices cannot be negative (schema CHECK amount_minor >= 0).
    #[error("Price amount cannot be negative: {0}")]
    NegativeAmount(MinorAmount),

    /// Two concurrent rotations raced; the loser should reload and retry.
    #[error("Concurrent price rotation detected, please retry")]
    ConcurrentRotation,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PricingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NoActivePrice { .. } => "NO_ACTIVE_PRICE",
            Self::ConflictingOpenPrices { .. } => "CONFLICTING_OPEN_PRICES",
            Self::NegativeAmount(_) => "NEGATIVE_PRICE",
            Self::ConcurrentRotation => "CONCURRENT_ROTATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NoActivePrice { .. } => 404,
            Self::NegativeAmount(_) => 400,
            Self::ConcurrentRotation => 409,
            Self::ConflictingOpenPrices { .. } | Self::Database(_) => 500,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentRotation)
    }
}
