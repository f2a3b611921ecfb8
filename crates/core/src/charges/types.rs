//! Charge classification types and resolved charge lines.

use serde::{Deserialize, Serialize};

use telar_shared::types::{ChargeRuleId, ChargeTypeId, MinorAmount};

/// Whether a charge adds to the buyer's total or subtracts from a seller's net.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeDirection {
    /// Charged on top of the subtotal (taxes, surcharges).
    Add,
    /// Deducted from the seller's share (platform commission).
    Subtract,
}

/// Whether a charge applies to the whole checkout or one seller's order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChargeScope {
    /// Applied once against the checkout subtotal.
    Checkout,
    /// Applied per order against that seller's gross.
    Order,
}

impl ChargeScope {
    /// The enum value as stored in `payments.charge_scope`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checkout => "checkout",
            Self::Order => "order",
        }
    }
}

impl ChargeDirection {
    /// The enum value as stored in `payments.charge_direction`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
        }
    }
}

/// Audit snapshot of the inputs a charge was computed from.
///
/// Persisted as the `basis` jsonb column on `checkout_charges` so a charge
/// can always be re-derived (or disputed) later, even after the rule changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBasis {
    /// The subtotal the rule was applied to, minor units.
    pub subtotal_minor: MinorAmount,
    /// The rule's rate in basis points, if any.
    pub rate_bps: Option<i32>,
    /// The rule's fixed component, minor units, if any.
    pub fixed_minor: Option<MinorAmount>,
}

/// One resolved charge: a rule applied to a subtotal at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeLine {
    /// The rule that produced this line.
    pub rule_id: ChargeRuleId,
    /// The charge type classifying the line.
    pub charge_type_id: ChargeTypeId,
    /// Checkout- or order-scoped.
    pub scope: ChargeScope,
    /// Add or subtract.
    pub direction: ChargeDirection,
    /// Unsigned magnitude in minor units.
    pub amount_minor: MinorAmount,
    /// The computation inputs, for the audit trail.
    pub basis: ChargeBasis,
}

impl ChargeLine {
    /// The signed amount as persisted: positive for add, negative for subtract.
    #[must_use]
    pub const fn signed_amount(&self) -> MinorAmount {
        match self.direction {
            ChargeDirection::Add => self.amount_minor,
            ChargeDirection::Subtract => -self.amount_minor,
        }
    }
}

/// Sums the buyer-facing (add-direction, checkout-scope) charge total.
#[must_use]
pub fn buyer_charges_total(lines: &[ChargeLine]) -> MinorAmount {
    lines
        .iter()
        .filter(|l| l.scope == ChargeScope::Checkout && l.direction == ChargeDirection::Add)
        .map(|l| l.amount_minor)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(direction: ChargeDirection, scope: ChargeScope, amount: MinorAmount) -> ChargeLine {
        ChargeLine {
            rule_id: ChargeRuleId::new(),
            charge_type_id: ChargeTypeId::new(),
            scope,
            direction,
            amount_minor: amount,
            basis: ChargeBasis {
                subtotal_minor: 0,
                rate_bps: None,
                fixed_minor: None,
            },
        }
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(
            line(ChargeDirection::Add, ChargeScope::Checkout, 500).signed_amount(),
            500
        );
        assert_eq!(
            line(ChargeDirection::Subtract, ChargeScope::Order, 500).signed_amount(),
            -500
        );
    }

    #[test]
    fn test_buyer_charges_total_ignores_order_scope() {
        let lines = vec![
            line(ChargeDirection::Add, ChargeScope::Checkout, 5_000),
            line(ChargeDirection::Add, ChargeScope::Checkout, 1_900),
            line(ChargeDirection::Subtract, ChargeScope::Order, 10_000),
            line(ChargeDirection::Add, ChargeScope::Order, 700),
        ];
        assert_eq!(buyer_charges_total(&lines), 6_900);
    }

    #[test]
    fn test_buyer_charges_total_empty() {
        assert_eq!(buyer_charges_total(&[]), 0);
    }
}
