//! Checkout totals and the per-seller order fan-out.
//!
//! A checkout stores `subtotal + charges = total` as three columns; the
//! equality is validated at write time rather than trusted. Orders are
//! one per seller shop, and the sum of their item subtotals must equal
//! the checkout subtotal exactly.

use chrono::{DateTime, Utc};

use telar_shared::types::{Currency, MinorAmount, ShopId};

use crate::cart::CartItemDraft;
use crate::charges::{ChargeLine, ChargeScope, ChargeRule, buyer_charges_total, resolve_charges};
use crate::checkout::error::CheckoutError;
use crate::context::SaleContext;

/// The three persisted checkout amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutTotals {
    /// Sum of item line totals, minor units.
    pub subtotal_minor: MinorAmount,
    /// Buyer-facing charge total, minor units.
    pub charges_minor: MinorAmount,
    /// Grand total the buyer pays, minor units.
    pub total_minor: MinorAmount,
}

impl CheckoutTotals {
    /// Computes totals from a subtotal and resolved charge lines.
    pub fn compute(
        subtotal_minor: MinorAmount,
        charges: &[ChargeLine],
    ) -> Result<Self, CheckoutError> {
        let charges_minor = buyer_charges_total(charges);
        let total = i128::from(subtotal_minor) + i128::from(charges_minor);
        let total_minor =
            MinorAmount::try_from(total).map_err(|_| CheckoutError::AmountOverflow)?;
        Ok(Self {
            subtotal_minor,
            charges_minor,
            total_minor,
        })
    }
}

/// Checks the stored invariant `subtotal + charges = total`.
pub const fn verify_totals(
    subtotal_minor: MinorAmount,
    charges_minor: MinorAmount,
    total_minor: MinorAmount,
) -> Result<(), CheckoutError> {
    if subtotal_minor + charges_minor == total_minor {
        Ok(())
    } else {
        Err(CheckoutError::TotalsMismatch {
            subtotal_minor,
            charges_minor,
            total_minor,
        })
    }
}

/// One per-seller order carved out of a checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// The seller this order belongs to.
    pub seller_shop_id: ShopId,
    /// The items sold by this seller, in cart order.
    pub items: Vec<CartItemDraft>,
    /// Sum of this order's item line totals, minor units.
    pub subtotal_minor: MinorAmount,
    /// Order-scope charge lines applied to this order.
    pub charges: Vec<ChargeLine>,
    /// What the seller receives after order-scope charges.
    pub net_to_seller_minor: MinorAmount,
}

/// Splits cart items into one order per seller, applying order-scope
/// rules to each order's own subtotal. The orders' subtotals always sum
/// back to the cart subtotal; only the nets differ from it.
pub fn split_orders(
    items: &[CartItemDraft],
    rules: &[ChargeRule],
    context: SaleContext,
    currency: Currency,
    at: DateTime<Utc>,
) -> Result<Vec<OrderDraft>, CheckoutError> {
    if items.is_empty() {
        return Err(CheckoutError::Cart(crate::cart::CartError::Empty));
    }

    // Group by seller, preserving first-seen order.
    let mut sellers: Vec<ShopId> = Vec::new();
    for item in items {
        if !sellers.contains(&item.seller_shop_id) {
            sellers.push(item.seller_shop_id);
        }
    }

    let mut orders = Vec::with_capacity(sellers.len());
    for seller in sellers {
        let seller_items: Vec<CartItemDraft> = items
            .iter()
            .filter(|item| item.seller_shop_id == seller)
            .cloned()
            .collect();

        let mut subtotal: i128 = 0;
        for item in &seller_items {
            subtotal += i128::from(item.line_total()?);
        }
        let subtotal_minor =
            MinorAmount::try_from(subtotal).map_err(|_| CheckoutError::AmountOverflow)?;

        let charges: Vec<ChargeLine> =
            resolve_charges(rules, context, currency, subtotal_minor, at)
                .into_iter()
                .filter(|line| line.scope == ChargeScope::Order)
                .collect();

        let mut net: i128 = i128::from(subtotal_minor);
        for line in &charges {
            net += i128::from(line.signed_amount());
        }
        let net_to_seller_minor =
            MinorAmount::try_from(net).map_err(|_| CheckoutError::AmountOverflow)?;
        if net_to_seller_minor < 0 {
            return Err(CheckoutError::NegativeSellerNet {
                seller_shop_id: seller,
                net_minor: net_to_seller_minor,
            });
        }

        orders.push(OrderDraft {
            seller_shop_id: seller,
            items: seller_items,
            subtotal_minor,
            charges,
            net_to_seller_minor,
        });
    }

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    use crate::charges::{ChargeDirection, SaleContextMatch};
    use telar_shared::types::{ChargeRuleId, ChargeTypeId};

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn item(seller: ShopId, quantity: i32, unit_price: MinorAmount) -> CartItemDraft {
        CartItemDraft::new(
            Uuid::new_v4(),
            seller,
            quantity,
            unit_price,
            Currency::Cop,
            Currency::Cop,
        )
        .unwrap()
    }

    fn order_rule(rate_bps: i32, direction: ChargeDirection) -> ChargeRule {
        ChargeRule {
            id: ChargeRuleId::new(),
            charge_type_id: ChargeTypeId::new(),
            direction,
            scope: ChargeScope::Order,
            context: SaleContextMatch::Marketplace,
            currency: None,
            rate_bps: Some(rate_bps),
            fixed_minor: None,
            priority: 100,
            is_active: true,
            effective_from: at() - chrono::Duration::days(1),
            effective_to: None,
            created_at: at() - chrono::Duration::days(1),
        }
    }

    #[test]
    fn totals_satisfy_the_stored_invariant() {
        let totals = CheckoutTotals::compute(100_000, &[]).unwrap();
        assert_eq!(totals.total_minor, 100_000);
        assert!(
            verify_totals(
                totals.subtotal_minor,
                totals.charges_minor,
                totals.total_minor
            )
            .is_ok()
        );
    }

    #[test]
    fn totals_mismatch_is_rejected() {
        let err = verify_totals(100_000, 5_000, 104_000).unwrap_err();
        assert!(matches!(err, CheckoutError::TotalsMismatch { .. }));
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn one_order_per_seller_conserving_the_subtotal() {
        let seller_a = ShopId::new();
        let seller_b = ShopId::new();
        let items = vec![
            item(seller_a, 2, 50_000),
            item(seller_b, 1, 30_000),
            item(seller_a, 1, 10_000),
        ];

        let orders =
            split_orders(&items, &[], SaleContext::Marketplace, Currency::Cop, at()).unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].seller_shop_id, seller_a);
        assert_eq!(orders[0].subtotal_minor, 110_000);
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[1].seller_shop_id, seller_b);
        assert_eq!(orders[1].subtotal_minor, 30_000);

        let sum: MinorAmount = orders.iter().map(|o| o.subtotal_minor).sum();
        assert_eq!(sum, 140_000);
    }

    #[test]
    fn order_scope_subtract_reduces_net_only() {
        let seller = ShopId::new();
        let items = vec![item(seller, 2, 50_000)];
        let rules = vec![order_rule(1_000, ChargeDirection::Subtract)]; // 10%

        let orders =
            split_orders(&items, &rules, SaleContext::Marketplace, Currency::Cop, at()).unwrap();

        assert_eq!(orders[0].subtotal_minor, 100_000);
        assert_eq!(orders[0].net_to_seller_minor, 90_000);
        assert_eq!(orders[0].charges.len(), 1);
    }

    #[test]
    fn without_order_rules_net_equals_subtotal() {
        let seller = ShopId::new();
        let items = vec![item(seller, 2, 50_000)];

        let orders =
            split_orders(&items, &[], SaleContext::Marketplace, Currency::Cop, at()).unwrap();
        assert_eq!(orders[0].net_to_seller_minor, orders[0].subtotal_minor);
    }

    #[test]
    fn deductions_past_the_subtotal_are_rejected() {
        let seller = ShopId::new();
        let items = vec![item(seller, 1, 100)];
        let rules = vec![order_rule(20_000, ChargeDirection::Subtract)]; // 200%

        let err = split_orders(&items, &rules, SaleContext::Marketplace, Currency::Cop, at())
            .unwrap_err();
        assert!(matches!(err, CheckoutError::NegativeSellerNet { .. }));
    }

    #[test]
    fn empty_item_list_is_an_empty_cart() {
        let err =
            split_orders(&[], &[], SaleContext::Marketplace, Currency::Cop, at()).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Cart(crate::cart::CartError::Empty)
        ));
    }
}
