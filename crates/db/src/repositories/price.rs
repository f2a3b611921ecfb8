//! Price repository: resolution and close-then-open rotation.
//!
//! Rotation locks the key's rows FOR UPDATE, closes the open row and
//! inserts the replacement in one transaction. The partial unique index
//! `uq_product_prices_open` arbitrates the first-price race where there
//! is no row to lock yet.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use telar_core::context::SaleContext;
use telar_core::pricing::{
    PriceKey, PriceRow, PriceSource, PricingError, RotationPlan, resolve_price,
};
use telar_shared::types::{Currency, MinorAmount, PriceId};

use crate::entities::product_prices;
use crate::entities::sea_orm_active_enums;

fn db_err(err: DbErr) -> PricingError {
    PricingError::Database(err.to_string())
}

fn context_column(context: SaleContext) -> sea_orm_active_enums::SaleContext {
    match context {
        SaleContext::Marketplace => sea_orm_active_enums::SaleContext::Marketplace,
        SaleContext::Tenant(_) => sea_orm_active_enums::SaleContext::Tenant,
    }
}

fn to_core_row(model: product_prices::Model) -> Result<PriceRow, PricingError> {
    let context_str = match model.context {
        sea_orm_active_enums::SaleContext::Marketplace => "marketplace",
        sea_orm_active_enums::SaleContext::Tenant => "tenant",
    };
    let context = SaleContext::from_parts(context_str, model.context_shop_id)
        .map_err(|e| PricingError::Database(e.to_string()))?;
    let currency = model
        .currency
        .parse::<Currency>()
        .map_err(|e| PricingError::Database(e.to_string()))?;
    let source = match model.price_source.as_str() {
        "product_base" => PriceSource::ProductBase,
        "override" => PriceSource::Override,
        other => {
            return Err(PricingError::Database(format!(
                "unknown price source: {other}"
            )));
        }
    };

    Ok(PriceRow {
        id: PriceId::from_uuid(model.id),
        product_id: model.product_id,
        context,
        currency,
        amount_minor: model.amount_minor,
        source,
        is_active: model.is_active,
        effective_from: model.effective_from.with_timezone(&Utc),
        effective_to: model
            .effective_to
            .map(|t| t.with_timezone(&Utc)),
    })
}

async fn find_candidates<C: ConnectionTrait>(
    conn: &C,
    key: &PriceKey,
    for_update: bool,
) -> Result<Vec<PriceRow>, PricingError> {
    let mut query = product_prices::Entity::find()
        .filter(product_prices::Column::ProductId.eq(key.product_id))
        .filter(product_prices::Column::Context.eq(context_column(key.context)))
        .filter(product_prices::Column::Currency.eq(key.currency.code()));

    query = match key.context.context_shop_id() {
        Some(shop_id) => query.filter(product_prices::Column::ContextShopId.eq(shop_id)),
        None => query.filter(product_prices::Column::ContextShopId.is_null()),
    };

    if for_update {
        query = query.lock_exclusive();
    }

    let models = query.all(conn).await.map_err(db_err)?;
    models.into_iter().map(to_core_row).collect()
}

/// Price repository over `payments.product_prices`.
#[derive(Debug, Clone)]
pub struct PriceRepository {
    db: DatabaseConnection,
}

impl PriceRepository {
    /// Creates a new price repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Resolves the single open price for a key.
    ///
    /// # Errors
    ///
    /// `NoActivePrice` when no open row exists; `ConflictingOpenPrices`
    /// when the history is corrupt and carries more than one.
    pub async fn resolve(&self, key: &PriceKey) -> Result<PriceRow, PricingError> {
        let candidates = find_candidates(&self.db, key, false).await?;
        resolve_price(key, &candidates).cloned()
    }

    /// Full price history for a key, open and closed rows alike.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn history(&self, key: &PriceKey) -> Result<Vec<PriceRow>, PricingError> {
        find_candidates(&self.db, key, false).await
    }

    /// Replaces the open price for a key: closes the current open row and
    /// opens a new one, atomically. A rotation that changes neither amount
    /// nor source leaves the history untouched and returns the open row.
    ///
    /// # Errors
    ///
    /// `NegativeAmount` for a negative price; `ConcurrentRotation` when a
    /// racing writer opened a row first (retryable).
    pub async fn rotate(
        &self,
        key: &PriceKey,
        amount_minor: MinorAmount,
        source: PriceSource,
    ) -> Result<PriceRow, PricingError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let candidates = find_candidates(&txn, key, true).await?;
        let current_open = match resolve_price(key, &candidates) {
            Ok(row) => Some(row),
            Err(PricingError::NoActivePrice { .. }) => None,
            Err(err) => return Err(err),
        };

        let rotated_at = Utc::now();
        let plan = RotationPlan::new(current_open, amount_minor, source, rotated_at)?;
        if plan.is_noop(current_open) {
            // Nothing would change; keep the history free of zero-width rows.
            let open = current_open.cloned().ok_or(PricingError::ConcurrentRotation)?;
            txn.commit().await.map_err(db_err)?;
            return Ok(open);
        }

        if let Some(close_id) = plan.close {
            product_prices::Entity::update_many()
                .col_expr(
                    product_prices::Column::EffectiveTo,
                    Expr::value(plan.rotated_at),
                )
                .col_expr(product_prices::Column::UpdatedAt, Expr::value(plan.rotated_at))
                .filter(product_prices::Column::Id.eq(close_id.into_inner()))
                .exec(&txn)
                .await
                .map_err(db_err)?;
        }

        let new_id = Uuid::new_v4();
        let row = product_prices::ActiveModel {
            id: Set(new_id),
            product_id: Set(key.product_id),
            context: Set(context_column(key.context)),
            context_shop_id: Set(key.context.context_shop_id()),
            currency: Set(key.currency.code().to_owned()),
            amount_minor: Set(plan.new_amount_minor),
            price_source: Set(plan.new_source.as_str().to_owned()),
            is_active: Set(true),
            effective_from: Set(plan.rotated_at.into()),
            effective_to: Set(None),
            created_at: Set(plan.rotated_at.into()),
            updated_at: Set(plan.rotated_at.into()),
        };

        let inserted = match row.insert(&txn).await {
            Ok(model) => model,
            Err(err) => {
                // The first-price race has no row to lock; the partial unique
                // index catches the loser here.
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return Err(PricingError::ConcurrentRotation);
                }
                return Err(db_err(err));
            }
        };

        txn.commit().await.map_err(db_err)?;
        to_core_row(inserted)
    }
}
