//! Checkout error types.

use thiserror::Error;
use uuid::Uuid;

use telar_shared::types::{MinorAmount, ShopId};

use crate::cart::CartError;
use crate::ledger::LedgerError;

/// Errors that can occur on checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout not found.
    #[error("Checkout not found: {0}")]
    NotFound(Uuid),

    /// The requested status edge is not part of the machine.
    #[error("Invalid checkout transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// Stored totals do not satisfy `total = subtotal + charges`.
    #[error(
        "Checkout totals mismatch: subtotal {subtotal_minor} + charges {charges_minor} != total {total_minor}"
    )]
    TotalsMismatch {
        /// Items subtotal, minor units.
        subtotal_minor: MinorAmount,
        /// Buyer-facing charges, minor units.
        charges_minor: MinorAmount,
        /// Stored grand total, minor units.
        total_minor: MinorAmount,
    },

    /// Order-scope deductions drove a seller's net below zero.
    #[error("Net to seller {seller_shop_id} is negative: {net_minor}")]
    NegativeSellerNet {
        /// The seller.
        seller_shop_id: ShopId,
        /// The computed net, minor units.
        net_minor: MinorAmount,
    },

    /// The cart could not be frozen.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A settlement posting was rejected.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Total arithmetic overflowed the 64-bit minor-unit range.
    #[error("Checkout total overflows the supported amount range")]
    AmountOverflow,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CheckoutError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "CHECKOUT_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_CHECKOUT_TRANSITION",
            Self::TotalsMismatch { .. } => "TOTALS_MISMATCH",
            Self::NegativeSellerNet { .. } => "NEGATIVE_SELLER_NET",
            Self::Cart(inner) => inner.error_code(),
            Self::Ledger(inner) => inner.error_code(),
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::InvalidTransition { .. }
            | Self::TotalsMismatch { .. }
            | Self::NegativeSellerNet { .. } => 422,
            Self::Cart(inner) => inner.http_status_code(),
            Self::Ledger(inner) => inner.http_status_code(),
            Self::AmountOverflow => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Cart(inner) => inner.is_retryable(),
            Self::Ledger(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}
