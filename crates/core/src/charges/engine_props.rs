//! Property-based tests for the charge rule engine.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use telar_shared::types::{ChargeRuleId, ChargeTypeId, Currency};

use crate::context::SaleContext;

use super::engine::{ChargeRule, SaleContextMatch, resolve_charges};
use super::types::{ChargeDirection, ChargeScope};

fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap()
}

fn any_rule() -> impl Strategy<Value = ChargeRule> {
    (
        proptest::option::of(0i32..20_000),
        proptest::option::of(0i64..1_000_000),
        0i32..1_000,
        0i64..10_000_000,
    )
        .prop_map(|(rate_bps, fixed_minor, priority, created_offset)| ChargeRule {
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
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::seconds(created_offset),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Charge amounts are never negative for non-negative inputs.
    #[test]
    fn prop_amounts_nonnegative(
        rules in prop::collection::vec(any_rule(), 0..6),
        subtotal in 0i64..10_000_000_000,
    ) {
        let lines = resolve_charges(&rules, SaleContext::Marketplace, Currency::Cop, subtotal, at());
        for line in &lines {
            prop_assert!(line.amount_minor >= 0);
        }
    }

    /// Output order is sorted by (priority, created_at, id).
    #[test]
    fn prop_output_sorted_by_priority(
        rules in prop::collection::vec(any_rule(), 0..8),
        subtotal in 0i64..1_000_000,
    ) {
        let lines = resolve_charges(&rules, SaleContext::Marketplace, Currency::Cop, subtotal, at());
        let priorities: Vec<i32> = lines
            .iter()
            .map(|l| {
                rules
                    .iter()
                    .find(|r| r.id == l.rule_id)
                    .map(|r| r.priority)
                    .unwrap()
            })
            .collect();
        let mut sorted = priorities.clone();
        sorted.sort_unstable();
        prop_assert_eq!(priorities, sorted);
    }

    /// Every active, in-window rule produces exactly one line; resolution is
    /// deterministic for fixed inputs.
    #[test]
    fn prop_resolution_deterministic(
        rules in prop::collection::vec(any_rule(), 0..6),
        subtotal in 0i64..1_000_000,
    ) {
        let a = resolve_charges(&rules, SaleContext::Marketplace, Currency::Cop, subtotal, at());
        let b = resolve_charges(&rules, SaleContext::Marketplace, Currency::Cop, subtotal, at());
        prop_assert_eq!(a.len(), rules.len());
        prop_assert_eq!(a, b);
    }

    /// The rated component grows monotonically with the subtotal.
    #[test]
    fn prop_amount_monotone_in_subtotal(
        rule in any_rule(),
        subtotal_a in 0i64..1_000_000,
        delta in 0i64..1_000_000,
    ) {
        let low = rule.amount_for(subtotal_a);
        let high = rule.amount_for(subtotal_a + delta);
        prop_assert!(high >= low);
    }
}
