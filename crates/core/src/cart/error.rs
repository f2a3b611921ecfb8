//! Cart error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur on cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Cart not found.
    #[error("Cart not found: {0}")]
    NotFound(Uuid),

    /// Another writer bumped the version between read and write. The
    /// caller must reload the cart and reapply the change.
    #[error("Cart version conflict: expected {expected}, found {actual}")]
    VersionConflict {
        /// Version the caller read.
        expected: i32,
        /// Version currently stored.
        actual: i32,
    },

    /// The requested status edge is not part of the machine.
    #[error("Invalid cart transition from '{from}' to '{to}'")]
    InvalidTransition {
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// Item quantities must be positive.
    #[error("Item quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    /// Unit prices cannot be negative.
    #[error("Unit price cannot be negative: {0}")]
    NegativeUnitPrice(i64),

    /// All items in a cart must share the cart's currency.
    #[error("Item currency '{item}' does not match cart currency '{cart}'")]
    CurrencyMismatch {
        /// Currency on the item.
        item: String,
        /// Currency on the cart.
        cart: String,
    },

    /// Item mutations are only allowed while the cart is open.
    #[error("Cart is not open (status '{status}')")]
    NotOpen {
        /// Current status.
        status: &'static str,
    },

    /// A cart must hold at least one item before checkout.
    #[error("Cart has no items")]
    Empty,

    /// Subtotal arithmetic overflowed the 64-bit minor-unit range.
    #[error("Cart subtotal overflows the supported amount range")]
    AmountOverflow,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl CartError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "CART_NOT_FOUND",
            Self::VersionConflict { .. } => "CART_VERSION_CONFLICT",
            Self::InvalidTransition { .. } => "INVALID_CART_TRANSITION",
            Self::NotOpen { .. } => "CART_NOT_OPEN",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::NegativeUnitPrice(_) => "NEGATIVE_UNIT_PRICE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::Empty => "EMPTY_CART",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::VersionConflict { .. } => 409,
            Self::InvalidTransition { .. } | Self::NotOpen { .. } | Self::Empty => 422,
            Self::InvalidQuantity(_)
            | Self::NegativeUnitPrice(_)
            | Self::CurrencyMismatch { .. }
            | Self::AmountOverflow => 400,
            Self::Database(_) => 500,
        }
    }

    /// Returns true if retrying the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
