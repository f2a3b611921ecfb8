//! Charge rule resolution.
//!
//! `resolve_charges` is pure: the db layer loads candidate rule rows and the
//! engine filters, orders and prices them. Keeping the selection logic out of
//! SQL means the ordering and rounding rules are unit-testable without a
//! database.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use telar_shared::types::{ChargeRuleId, ChargeTypeId, Currency, MinorAmount};

use crate::context::SaleContext;

use super::types::{ChargeBasis, ChargeDirection, ChargeLine, ChargeScope};

/// A charge rule row as loaded from `payments.charge_rules` (joined with its
/// charge type for direction/scope).
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRule {
    /// Rule id.
    pub id: ChargeRuleId,
    /// The charge type this rule materializes.
    pub charge_type_id: ChargeTypeId,
    /// Add or subtract (from the charge type).
    pub direction: ChargeDirection,
    /// Checkout- or order-scoped (from the charge type).
    pub scope: ChargeScope,
    /// Context the rule applies in.
    pub context: SaleContextMatch,
    /// Currency restriction; `None` matches any currency.
    pub currency: Option<Currency>,
    /// Rate in basis points (1 bps = 0.01%).
    pub rate_bps: Option<i32>,
    /// Fixed component, minor units.
    pub fixed_minor: Option<MinorAmount>,
    /// Application order; lower applies first.
    pub priority: i32,
    /// Whether the rule is live.
    pub is_active: bool,
    /// Start of the effective window (inclusive).
    pub effective_from: DateTime<Utc>,
    /// End of the effective window (exclusive); `None` = open-ended.
    pub effective_to: Option<DateTime<Utc>>,
    /// Row creation time; tiebreak after priority.
    pub created_at: DateTime<Utc>,
}

/// How a rule is scoped to sale contexts.
///
/// A marketplace rule matches marketplace sales; a tenant rule matches either
/// every tenant storefront (`shop_id = None`) or one specific shop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "context", content = "context_shop_id", rename_all = "lowercase")]
pub enum SaleContextMatch {
    /// Applies to marketplace sales.
    Marketplace,
    /// Applies to tenant sales, optionally narrowed to one shop.
    Tenant(Option<Uuid>),
}

impl SaleContextMatch {
    /// Whether the rule's context scope covers the given sale context.
    #[must_use]
    pub fn matches(self, context: SaleContext) -> bool {
        match (self, context) {
            (Self::Marketplace, SaleContext::Marketplace) => true,
            (Self::Tenant(None), SaleContext::Tenant(_)) => true,
            (Self::Tenant(Some(rule_shop)), SaleContext::Tenant(shop)) => {
                rule_shop == shop.into_inner()
            }
            _ => false,
        }
    }
}

impl ChargeRule {
    /// Whether this rule applies to the given sale at the given instant.
    #[must_use]
    pub fn applies(&self, context: SaleContext, currency: Currency, at: DateTime<Utc>) -> bool {
        if !self.is_active || !self.context.matches(context) {
            return false;
        }
        if let Some(rule_currency) = self.currency {
            if rule_currency != currency {
                return false;
            }
        }
        if at < self.effective_from {
            return false;
        }
        match self.effective_to {
            Some(until) => at < until,
            None => true,
        }
    }

    /// Computes the charge magnitude for a subtotal.
    ///
    /// `fixed_minor + round_half_up(subtotal * rate_bps / 10000)`, in i128 so
    /// the product cannot overflow.
    #[must_use]
    pub fn amount_for(&self, subtotal_minor: MinorAmount) -> MinorAmount {
        let fixed = self.fixed_minor.unwrap_or(0);
        let rated = match self.rate_bps {
            Some(bps) => round_bps(subtotal_minor, bps),
            None => 0,
        };
        fixed + rated
    }
}

/// `round_half_up(subtotal * bps / 10000)` for non-negative operands.
fn round_bps(subtotal_minor: MinorAmount, bps: i32) -> MinorAmount {
    let product = i128::from(subtotal_minor) * i128::from(bps);
    let rounded = (product + 5_000) / 10_000;
    MinorAmount::try_from(rounded).unwrap_or(MinorAmount::MAX)
}

/// Resolves the charge lines for a subtotal in a sale context.
///
/// Matching rules are applied in priority order (ascending), creation-time
/// then id tiebreak for determinism. Each line's magnitude is computed from
/// the *same* subtotal: rules stack additively, they do not compound.
/// An empty result is valid: no matching rule means a free checkout.
#[must_use]
pub fn resolve_charges(
    rules: &[ChargeRule],
    context: SaleContext,
    currency: Currency,
    subtotal_minor: MinorAmount,
    at: DateTime<Utc>,
) -> Vec<ChargeLine> {
    let mut matched: Vec<&ChargeRule> = rules
        .iter()
        .filter(|rule| rule.applies(context, currency, at))
        .collect();

    matched.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.into_inner().cmp(&b.id.into_inner()))
    });

    matched
        .into_iter()
        .map(|rule| ChargeLine {
            rule_id: rule.id,
            charge_type_id: rule.charge_type_id,
            scope: rule.scope,
            direction: rule.direction,
            amount_minor: rule.amount_for(subtotal_minor),
            basis: ChargeBasis {
                subtotal_minor,
                rate_bps: rule.rate_bps,
                fixed_minor: rule.fixed_minor,
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn rule(rate_bps: Option<i32>, fixed_minor: Option<i64>, priority: i32) -> ChargeRule {
        ChargeRule {
            id: ChargeRuleId::new(),
            charge_type_id: ChargeTypeId::new(),
            direction: ChargeDirection::Add,
            scope: ChargeScope::Checkout,
            context: SaleContextMatch::Marketplace,
            currency: None,
            rate_bps,
            fixed_minor,
            priority,
            is_active: true,
            effective_from: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            effective_to: None,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_five_percent_fee() {
        // The worked example: 5% marketplace fee on a 100000 subtotal.
        let rules = vec![rule(Some(500), None, 100)];
        let lines = resolve_charges(
            &rules,
            SaleContext::Marketplace,
            Currency::Cop,
            100_000,
            at(),
        );
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount_minor, 5_000);
        assert_eq!(lines[0].basis.subtotal_minor, 100_000);
        assert_eq!(lines[0].basis.rate_bps, Some(500));
    }

    #[test]
    fn test_rounding_half_up() {
        // 2.5% of 99 minor = 2.475 → 2; 2.5% of 100 = 2.5 → 3.
        let rules = vec![rule(Some(250), None, 100)];
        assert_eq!(
            resolve_charges(&rules, SaleContext::Marketplace, Currency::Cop, 99, at())[0]
                .amount_minor,
            2
        );
        assert_eq!(
            resolve_charges(&rules, SaleContext::Marketplace, Currency::Cop, 100, at())[0]
                .amount_minor,
            3
        );
    }

    #[test]
    fn test_fixed_plus_rate() {
        let rules = vec![rule(Some(100), Some(900), 100)];
        let lines = resolve_charges(
            &rules,
            SaleContext::Marketplace,
            Currency::Cop,
            50_000,
            at(),
        );
        // 900 fixed + 1% of 50000 = 900 + 500
        assert_eq!(lines[0].amount_minor, 1_400);
    }

    #[test]
    fn test_no_matching_rules_is_zero_lines() {
        // Explicit non-failure policy: absence of rules means a free checkout.
        let lines = resolve_charges(&[], SaleContext::Marketplace, Currency::Cop, 100_000, at());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_inactive_rule_skipped() {
        let mut inactive = rule(Some(500), None, 100);
        inactive.is_active = false;
        let lines = resolve_charges(
            &[inactive],
            SaleContext::Marketplace,
            Currency::Cop,
            100_000,
            at(),
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn test_effective_window() {
        let mut expired = rule(Some(500), None, 100);
        expired.effective_to = Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap());

        let mut future = rule(Some(500), None, 100);
        future.effective_from = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();

        let lines = resolve_charges(
            &[expired, future],
            SaleContext::Marketplace,
            Currency::Cop,
            100_000,
            at(),
        );
        assert!(lines.is_empty());
    }

    #[test]
    fn test_effective_to_boundary_is_exclusive() {
        let mut r = rule(Some(500), None, 100);
        r.effective_to = Some(at());
        assert!(!r.applies(SaleContext::Marketplace, Currency::Cop, at()));

        let mut r = rule(Some(500), None, 100);
        r.effective_from = at();
        assert!(r.applies(SaleContext::Marketplace, Currency::Cop, at()));
    }

    #[test]
    fn test_currency_restriction() {
        let mut usd_only = rule(Some(500), None, 100);
        usd_only.currency = Some(Currency::Usd);
        assert!(!usd_only.applies(SaleContext::Marketplace, Currency::Cop, at()));
        assert!(usd_only.applies(SaleContext::Marketplace, Currency::Usd, at()));
    }

    #[test]
    fn test_priority_ordering() {
        let mut tax = rule(Some(1_900), None, 200);
        tax.created_at = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
        let fee = rule(Some(500), None, 100);

        let lines = resolve_charges(
            &[tax.clone(), fee.clone()],
            SaleContext::Marketplace,
            Currency::Cop,
            100_000,
            at(),
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].rule_id, fee.id, "lower priority applies first");
        assert_eq!(lines[1].rule_id, tax.id);
    }

    #[test]
    fn test_rules_stack_on_same_subtotal() {
        // Two 5% rules on 100000 each yield 5000: stacking, not compounding.
        let lines = resolve_charges(
            &[rule(Some(500), None, 100), rule(Some(500), None, 200)],
            SaleContext::Marketplace,
            Currency::Cop,
            100_000,
            at(),
        );
        assert_eq!(lines[0].amount_minor, 5_000);
        assert_eq!(lines[1].amount_minor, 5_000);
    }

    #[test]
    fn test_tenant_matching() {
        use telar_shared::types::ShopId;

        let shop = ShopId::new();
        let other = ShopId::new();

        let mut any_tenant = rule(Some(500), None, 100);
        any_tenant.context = SaleContextMatch::Tenant(None);

        let mut this_shop = rule(Some(300), None, 100);
        this_shop.context = SaleContextMatch::Tenant(Some(shop.into_inner()));

        assert!(any_tenant.applies(SaleContext::Tenant(shop), Currency::Cop, at()));
        assert!(any_tenant.applies(SaleContext::Tenant(other), Currency::Cop, at()));
        assert!(!any_tenant.applies(SaleContext::Marketplace, Currency::Cop, at()));

        assert!(this_shop.applies(SaleContext::Tenant(shop), Currency::Cop, at()));
        assert!(!this_shop.applies(SaleContext::Tenant(other), Currency::Cop, at()));
    }
}
