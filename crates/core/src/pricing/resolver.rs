//! Price resolution and rotation.
//!
//! At most one row per (product, context, currency) may be "open":
//! active with no `effective_to`. Changing a price never mutates the
//! open row in place; it closes the old row and opens a new one so the
//! full price history survives for audit.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use telar_shared::types::{Currency, MinorAmount, PriceId};

use crate::context::SaleContext;
use crate::pricing::error::PricingError;

/// Where a price row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    /// The product's base price, mirrored into the context.
    ProductBase,
    /// A manual override set for this context specifically.
    Override,
}

impl PriceSource {
    /// Database representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProductBase => "product_base",
            Self::Override => "override",
        }
    }
}

/// The lookup key for a price: one open row may exist per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceKey {
    /// Product being priced.
    pub product_id: Uuid,
    /// Sale context (marketplace or a specific tenant shop).
    pub context: SaleContext,
    /// Currency the price is denominated in.
    pub currency: Currency,
}

impl PriceKey {
    /// Builds a key.
    #[must_use]
    pub const fn new(product_id: Uuid, context: SaleContext, currency: Currency) -> Self {
        Self {
            product_id,
            context,
            currency,
        }
    }
}

/// A price row as stored, independent of any particular persistence layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRow {
    /// Row id.
    pub id: PriceId,
    /// Product being priced.
    pub product_id: Uuid,
    /// Sale context the price applies in.
    pub context: SaleContext,
    /// Currency.
    pub currency: Currency,
    /// Price in minor units, never negative.
    pub amount_minor: MinorAmount,
    /// Where the price came from.
    pub source: PriceSource,
    /// Whether the row participates in resolution.
    pub is_active: bool,
    /// When the price became effective.
    pub effective_from: DateTime<Utc>,
    /// When the price stopped being effective; `None` means still open.
    pub effective_to: Option<DateTime<Utc>>,
}

impl PriceRow {
    /// An open row is active and has no end timestamp.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.is_active && self.effective_to.is_none()
    }
}

/// Resolves the current price from the candidate rows for a key.
///
/// Exactly one open row is expected. Zero open rows is `NoActivePrice`;
/// more than one means the partial unique index was bypassed and the
/// data needs repair.
pub fn resolve_price<'a>(
    key: &PriceKey,
    candidates: &'a [PriceRow],
) -> Result<&'a PriceRow, PricingError> {
    let mut open = candidates.iter().filter(|row| row.is_open());

    let Some(first) = open.next() else {
        return Err(PricingError::NoActivePrice {
            product_id: key.product_id,
            context: key.context.as_str().to_owned(),
            currency: key.currency.code().to_owned(),
        });
    };

    if open.next().is_some() {
        return Err(PricingError::ConflictingOpenPrices {
            product_id: key.product_id,
        });
    }

    Ok(first)
}

/// Plan for replacing the open price of a key: close the current row
/// (if any) at `rotated_at`, then open a new row effective from the
/// same instant. Both steps must run in one database transaction so
/// the partial unique index never sees two open rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    /// Row to close, `None` when no price existed yet.
    pub close: Option<PriceId>,
    /// New price amount in minor units.
    pub new_amount_minor: MinorAmount,
    /// Source of the new price.
    pub new_source: PriceSource,
    /// Close/open boundary timestamp.
    pub rotated_at: DateTime<Utc>,
}

impl RotationPlan {
    /// Builds a rotation plan, rejecting negative amounts up front.
    pub fn new(
        current_open: Option<&PriceRow>,
        new_amount_minor: MinorAmount,
        new_source: PriceSource,
        rotated_at: DateTime<Utc>,
    ) -> Result<Self, PricingError> {
        if new_amount_minor < 0 {
            return Err(PricingError::NegativeAmount(new_amount_minor));
        }
        Ok(Self {
            close: current_open.map(|row| row.id),
            new_amount_minor,
            new_source,
            rotated_at,
        })
    }

    /// True when the rotation would change nothing (same amount and
    /// source as the currently open row). Callers may skip the write.
    #[must_use]
    pub fn is_noop(&self, current_open: Option<&PriceRow>) -> bool {
        current_open.is_some_and(|row| {
            self.close == Some(row.id)
                && row.amount_minor == self.new_amount_minor
                && row.source == self.new_source
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap()
    }

    fn row(id: PriceId, product: Uuid, amount: MinorAmount, open: bool) -> PriceRow {
        PriceRow {
            id,
            product_id: product,
            context: SaleContext::Marketplace,
            currency: Currency::Cop,
            amount_minor: amount,
            source: PriceSource::ProductBase,
            is_active: true,
            effective_from: at(0),
            effective_to: if open { None } else { Some(at(100)) },
        }
    }

    fn key(product: Uuid) -> PriceKey {
        PriceKey::new(product, SaleContext::Marketplace, Currency::Cop)
    }

    #[test]
    fn resolves_single_open_row() {
        let product = Uuid::new_v4();
        let open_id = PriceId::new();
        let rows = vec![
            row(PriceId::new(), product, 40_000, false),
            row(open_id, product, 50_000, true),
        ];

        let resolved = resolve_price(&key(product), &rows).unwrap();
        assert_eq!(resolved.id, open_id);
        assert_eq!(resolved.amount_minor, 50_000);
    }

    #[test]
    fn no_open_row_is_no_active_price() {
        let product = Uuid::new_v4();
        let rows = vec![row(PriceId::new(), product, 40_000, false)];

        let err = resolve_price(&key(product), &rows).unwrap_err();
        assert!(matches!(err, PricingError::NoActivePrice { .. }));
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn inactive_row_is_not_open() {
        let product = Uuid::new_v4();
        let mut stale = row(PriceId::new(), product, 40_000, true);
        stale.is_active = false;

        let err = resolve_price(&key(product), &[stale]).unwrap_err();
        assert!(matches!(err, PricingError::NoActivePrice { .. }));
    }

    #[test]
    fn two_open_rows_is_integrity_violation() {
        let product = Uuid::new_v4();
        let rows = vec![
            row(PriceId::new(), product, 40_000, true),
            row(PriceId::new(), product, 50_000, true),
        ];

        let err = resolve_price(&key(product), &rows).unwrap_err();
        assert!(matches!(err, PricingError::ConflictingOpenPrices { .. }));
        assert_eq!(err.http_status_code(), 500);
    }

    #[test]
    fn rotation_closes_current_and_opens_new() {
        let product = Uuid::new_v4();
        let current = row(PriceId::new(), product, 50_000, true);

        let plan =
            RotationPlan::new(Some(&current), 55_000, PriceSource::Override, at(500)).unwrap();

        assert_eq!(plan.close, Some(current.id));
        assert_eq!(plan.new_amount_minor, 55_000);
        assert!(!plan.is_noop(Some(&current)));
    }

    #[test]
    fn first_price_has_nothing_to_close() {
        let plan = RotationPlan::new(None, 50_000, PriceSource::ProductBase, at(0)).unwrap();
        assert_eq!(plan.close, None);
    }

    #[test]
    fn negative_amount_rejected() {
        let err = RotationPlan::new(None, -1, PriceSource::ProductBase, at(0)).unwrap_err();
        assert!(matches!(err, PricingError::NegativeAmount(-1)));
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn same_amount_and_source_is_noop() {
        let product = Uuid::new_v4();
        let current = row(PriceId::new(), product, 50_000, true);

        let plan =
            RotationPlan::new(Some(&current), 50_000, PriceSource::ProductBase, at(1)).unwrap();
        assert!(plan.is_noop(Some(&current)));
    }
}
