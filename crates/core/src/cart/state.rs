//! Cart status machine and optimistic-locking helpers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use telar_shared::types::{Currency, MinorAmount, ShopId};

use crate::cart::error::CartError;

/// Lifecycle of a cart.
///
/// Open carts accept item mutations. A starting checkout locks the
/// cart; a paid checkout converts it; a failed checkout unlocks it
/// back to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Accepting mutations.
    Open,
    /// Frozen by an in-flight checkout.
    Locked,
    /// Checkout paid; terminal.
    Converted,
    /// Given up; terminal.
    Abandoned,
}

/// Result of an abandonment request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbandonOutcome {
    /// The cart moved to abandoned.
    Abandoned,
    /// The cart was already terminal; nothing changed.
    NoOp,
}

impl CartStatus {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Locked => "locked",
            Self::Converted => "converted",
            Self::Abandoned => "abandoned",
        }
    }

    /// Whether the edge `self -> to` is part of the machine.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Open, Self::Locked | Self::Abandoned)
                | (Self::Locked, Self::Open | Self::Converted | Self::Abandoned)
        )
    }

    /// Applies a transition, rejecting edges the machine does not declare.
    pub fn transition(self, to: Self) -> Result<Self, CartError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(CartError::InvalidTransition {
                from: self.as_str(),
                to: to.as_str(),
            })
        }
    }

    /// Abandonment is idempotent: a cart that already reached a terminal
    /// status (a concurrent checkout converted it, or a retry) is a no-op
    /// rather than an error.
    #[must_use]
    pub const fn try_abandon(self) -> AbandonOutcome {
        match self {
            Self::Open | Self::Locked => AbandonOutcome::Abandoned,
            Self::Converted | Self::Abandoned => AbandonOutcome::NoOp,
        }
    }

    /// Only open carts accept item mutations.
    #[must_use]
    pub const fn accepts_mutations(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Terminal statuses never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Converted | Self::Abandoned)
    }
}

/// Compares the version a caller read against the stored one. Meant to
/// mirror the `UPDATE .. WHERE version = ?` guard for pure-logic callers.
pub const fn check_version(expected: i32, actual: i32) -> Result<(), CartError> {
    if expected == actual {
        Ok(())
    } else {
        Err(CartError::VersionConflict { expected, actual })
    }
}

/// An item a caller wants in a cart, validated before it touches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItemDraft {
    /// Product being bought.
    pub product_id: Uuid,
    /// Shop that sells the product; orders fan out per seller.
    pub seller_shop_id: ShopId,
    /// Units requested, always positive.
    pub quantity: i32,
    /// Price per unit in minor units, frozen at add time.
    pub unit_price_minor: MinorAmount,
    /// Currency of the unit price.
    pub currency: Currency,
}

impl CartItemDraft {
    /// Validates and builds an item draft.
    pub fn new(
        product_id: Uuid,
        seller_shop_id: ShopId,
        quantity: i32,
        unit_price_minor: MinorAmount,
        currency: Currency,
        cart_currency: Currency,
    ) -> Result<Self, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }
        if unit_price_minor < 0 {
            return Err(CartError::NegativeUnitPrice(unit_price_minor));
        }
        if currency != cart_currency {
            return Err(CartError::CurrencyMismatch {
                item: currency.code().to_owned(),
                cart: cart_currency.code().to_owned(),
            });
        }
        Ok(Self {
            product_id,
            seller_shop_id,
            quantity,
            unit_price_minor,
            currency,
        })
    }

    /// Line total: quantity × unit price, checked against i64 overflow.
    pub fn line_total(&self) -> Result<MinorAmount, CartError> {
        let total = i128::from(self.quantity) * i128::from(self.unit_price_minor);
        MinorAmount::try_from(total).map_err(|_| CartError::AmountOverflow)
    }
}

/// Sums line totals across a cart. An empty cart is rejected here so
/// checkout creation never has to special-case it.
pub fn cart_subtotal(items: &[CartItemDraft]) -> Result<MinorAmount, CartError> {
    if items.is_empty() {
        return Err(CartError::Empty);
    }
    let mut sum: i128 = 0;
    for item in items {
        sum += i128::from(item.line_total()?);
    }
    MinorAmount::try_from(sum).map_err(|_| CartError::AmountOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn draft(quantity: i32, unit_price: MinorAmount) -> CartItemDraft {
        CartItemDraft::new(
            Uuid::new_v4(),
            ShopId::new(),
            quantity,
            unit_price,
            Currency::Cop,
            Currency::Cop,
        )
        .unwrap()
    }

    #[rstest]
    #[case(CartStatus::Open, CartStatus::Locked, true)]
    #[case(CartStatus::Open, CartStatus::Abandoned, true)]
    #[case(CartStatus::Open, CartStatus::Converted, false)]
    #[case(CartStatus::Locked, CartStatus::Open, true)]
    #[case(CartStatus::Locked, CartStatus::Converted, true)]
    #[case(CartStatus::Locked, CartStatus::Abandoned, true)]
    #[case(CartStatus::Converted, CartStatus::Open, false)]
    #[case(CartStatus::Abandoned, CartStatus::Open, false)]
    #[case(CartStatus::Converted, CartStatus::Abandoned, false)]
    fn transition_edges(#[case] from: CartStatus, #[case] to: CartStatus, #[case] allowed: bool) {
        assert_eq!(from.can_transition_to(to), allowed);
        assert_eq!(from.transition(to).is_ok(), allowed);
    }

    #[test]
    fn invalid_transition_reports_both_ends() {
        let err = CartStatus::Converted.transition(CartStatus::Open).unwrap_err();
        assert!(matches!(
            err,
            CartError::InvalidTransition {
                from: "converted",
                to: "open"
            }
        ));
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn abandon_is_idempotent_on_terminal_carts() {
        assert_eq!(CartStatus::Open.try_abandon(), AbandonOutcome::Abandoned);
        assert_eq!(CartStatus::Locked.try_abandon(), AbandonOutcome::Abandoned);
        assert_eq!(CartStatus::Converted.try_abandon(), AbandonOutcome::NoOp);
        assert_eq!(CartStatus::Abandoned.try_abandon(), AbandonOutcome::NoOp);
    }

    #[test]
    fn version_check_matches_or_conflicts() {
        assert!(check_version(3, 3).is_ok());
        let err = check_version(3, 4).unwrap_err();
        assert!(matches!(
            err,
            CartError::VersionConflict {
                expected: 3,
                actual: 4
            }
        ));
        assert_eq!(err.http_status_code(), 409);
        assert!(err.is_retryable());
    }

    #[test]
    fn item_draft_rejects_bad_input() {
        let shop = ShopId::new();
        let zero_qty = CartItemDraft::new(
            Uuid::new_v4(),
            shop,
            0,
            1000,
            Currency::Cop,
            Currency::Cop,
        );
        assert!(matches!(zero_qty, Err(CartError::InvalidQuantity(0))));

        let negative = CartItemDraft::new(
            Uuid::new_v4(),
            shop,
            1,
            -5,
            Currency::Cop,
            Currency::Cop,
        );
        assert!(matches!(negative, Err(CartError::NegativeUnitPrice(-5))));

        let wrong_currency = CartItemDraft::new(
            Uuid::new_v4(),
            shop,
            1,
            1000,
            Currency::Usd,
            Currency::Cop,
        );
        assert!(matches!(
            wrong_currency,
            Err(CartError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn subtotal_sums_line_totals() {
        let items = vec![draft(2, 50_000), draft(1, 30_000)];
        assert_eq!(cart_subtotal(&items).unwrap(), 130_000);
    }

    #[test]
    fn empty_cart_has_no_subtotal() {
        assert!(matches!(cart_subtotal(&[]), Err(CartError::Empty)));
    }

    #[test]
    fn line_total_overflow_is_caught() {
        let item = draft(i32::MAX, MinorAmount::MAX);
        assert!(matches!(item.line_total(), Err(CartError::AmountOverflow)));
    }
}
