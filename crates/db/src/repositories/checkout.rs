//! Checkout repository: freezing a cart into an immutable priced snapshot.
//!
//! Creation is one transaction: lock the cart, price the items, resolve
//! charges, fan the items out into per-seller orders, and persist the
//! whole snapshot. The `idempotency_key` unique constraint makes retries
//! return the first snapshot instead of building a second one.

use chrono::Utc;
use serde::Serialize;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use telar_core::cart::{CartItemDraft, CartStatus, cart_subtotal};
use telar_core::charges::{ChargeLine, ChargeScope};
use telar_core::checkout::{CheckoutError, CheckoutStatus, CheckoutTotals, split_orders};
use telar_core::context::SaleContext;
use telar_shared::types::{CartId, CheckoutId, Currency, ShopId};

use crate::entities::sea_orm_active_enums;
use crate::entities::{carts, cart_items, checkout_charges, checkouts, order_items, orders};
use crate::repositories::cart::{cart_currency, transition_in as cart_transition_in};
use crate::repositories::charge_rule::load_rules;

fn db_err(err: DbErr) -> CheckoutError {
    CheckoutError::Database(err.to_string())
}

/// Input for creating a checkout from a cart.
#[derive(Debug, Clone)]
pub struct CreateCheckout {
    /// The cart to freeze.
    pub cart_id: CartId,
    /// Client-supplied replay token.
    pub idempotency_key: String,
}

/// A checkout with its orders and charge snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutWithOrders {
    /// The checkout row.
    pub checkout: checkouts::Model,
    /// Per-seller orders with their items.
    pub orders: Vec<(orders::Model, Vec<order_items::Model>)>,
    /// The resolved charge snapshot.
    pub charges: Vec<checkout_charges::Model>,
}

/// Checkout repository over `payments.checkouts` and its child tables.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    db: DatabaseConnection,
}

impl CheckoutRepository {
    /// Creates a new checkout repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Freezes a cart into a checkout. Replaying the same idempotency key
    /// returns the stored checkout without touching the cart again.
    ///
    /// # Errors
    ///
    /// Cart errors when the cart is missing, empty or not open; checkout
    /// errors when pricing or the order fan-out rejects the contents.
    pub async fn create_from_cart(
        &self,
        input: CreateCheckout,
    ) -> Result<CheckoutWithOrders, CheckoutError> {
        if let Some(existing) = self.find_by_idempotency_key(&input.idempotency_key).await? {
            return Ok(existing);
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        // Locking is idempotent: a cart already locked by a crashed earlier
        // attempt passes through.
        let cart = cart_transition_in(&txn, input.cart_id, CartStatus::Open, CartStatus::Locked)
            .await?;
        let currency = cart_currency(&cart)?;
        let context = cart_context(&cart)?;

        let item_models = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(input.cart_id.into_inner()))
            .order_by_asc(cart_items::Column::CreatedAt)
            .all(&txn)
            .await
            .map_err(db_err)?;
        let drafts = drafts_from_items(&item_models, currency)?;

        let subtotal_minor = cart_subtotal(&drafts)?;
        let rules = load_rules(&txn, context).await.map_err(db_err)?;
        let now = Utc::now();
        let all_lines =
            telar_core::charges::resolve_charges(&rules, context, currency, subtotal_minor, now);
        let totals = CheckoutTotals::compute(subtotal_minor, &all_lines)?;
        let order_drafts = split_orders(&drafts, &rules, context, currency, now)?;

        let checkout_id = Uuid::new_v4();
        let row = checkouts::ActiveModel {
            id: Set(checkout_id),
            cart_id: Set(input.cart_id.into_inner()),
            buyer_user_id: Set(cart.buyer_user_id),
            context: Set(cart.context),
            context_shop_id: Set(cart.context_shop_id),
            currency: Set(currency.code().to_owned()),
            status: Set(sea_orm_active_enums::CheckoutStatus::Created),
            subtotal_minor: Set(totals.subtotal_minor),
            charges_total_minor: Set(totals.charges_minor),
            total_minor: Set(totals.total_minor),
            idempotency_key: Set(input.idempotency_key.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        if let Err(err) = row.insert(&txn).await {
            txn.rollback().await.map_err(db_err)?;
            // Lost the idempotency race; return the winner's snapshot.
            if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                return self
                    .find_by_idempotency_key(&input.idempotency_key)
                    .await?
                    .ok_or_else(|| {
                        CheckoutError::Database("conflicting checkout vanished".to_owned())
                    });
            }
            return Err(db_err(err));
        }

        // Checkout-scope charge snapshot rows.
        for line in all_lines.iter().filter(|l| l.scope == ChargeScope::Checkout) {
            insert_charge_row(&txn, checkout_id, None, line, currency, now).await?;
        }

        for draft in &order_drafts {
            let order_id = Uuid::new_v4();
            let order = orders::ActiveModel {
                id: Set(order_id),
                checkout_id: Set(checkout_id),
                seller_shop_id: Set(draft.seller_shop_id.into_inner()),
                currency: Set(currency.code().to_owned()),
                gross_subtotal_minor: Set(draft.subtotal_minor),
                net_to_seller_minor: Set(draft.net_to_seller_minor),
                status: Set(sea_orm_active_enums::OrderStatus::PendingFulfillment),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            order.insert(&txn).await.map_err(db_err)?;

            for item in &draft.items {
                let line_total = item.line_total()?;
                let order_item = order_items::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order_id),
                    product_id: Set(item.product_id),
                    quantity: Set(item.quantity),
                    currency: Set(item.currency.code().to_owned()),
                    unit_price_minor: Set(item.unit_price_minor),
                    line_total_minor: Set(line_total),
                    metadata: Set(serde_json::Value::Object(serde_json::Map::new())),
                    created_at: Set(now.into()),
                };
                order_item.insert(&txn).await.map_err(db_err)?;
            }

            for line in &draft.charges {
                insert_charge_row(&txn, checkout_id, Some(order_id), line, currency, now).await?;
            }
        }

        txn.commit().await.map_err(db_err)?;
        self.get(CheckoutId::from_uuid(checkout_id)).await
    }

    /// Loads a checkout with orders, items and the charge snapshot.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown checkout id.
    pub async fn get(&self, checkout_id: CheckoutId) -> Result<CheckoutWithOrders, CheckoutError> {
        let checkout = checkouts::Entity::find_by_id(checkout_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(CheckoutError::NotFound(checkout_id.into_inner()))?;
        self.assemble(checkout).await
    }

    /// Looks a checkout up by its idempotency key.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<CheckoutWithOrders>, CheckoutError> {
        let Some(checkout) = checkouts::Entity::find()
            .filter(checkouts::Column::IdempotencyKey.eq(idempotency_key))
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        Ok(Some(self.assemble(checkout).await?))
    }

    async fn assemble(
        &self,
        checkout: checkouts::Model,
    ) -> Result<CheckoutWithOrders, CheckoutError> {
        let order_rows = orders::Entity::find()
            .filter(orders::Column::CheckoutId.eq(checkout.id))
            .order_by_asc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let mut order_list = Vec::with_capacity(order_rows.len());
        for order in order_rows {
            let items = order_items::Entity::find()
                .filter(order_items::Column::OrderId.eq(order.id))
                .order_by_asc(order_items::Column::CreatedAt)
                .all(&self.db)
                .await
                .map_err(db_err)?;
            order_list.push((order, items));
        }

        let charges = checkout_charges::Entity::find()
            .filter(checkout_charges::Column::CheckoutId.eq(checkout.id))
            .order_by_asc(checkout_charges::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(CheckoutWithOrders {
            checkout,
            orders: order_list,
            charges,
        })
    }
}

/// Builds the persisted charge row for one resolved line. The stored
/// `amount_minor` is signed: positive for add, negative for subtract.
fn charge_row(
    checkout_id: Uuid,
    order_id: Option<Uuid>,
    line: &ChargeLine,
    currency: Currency,
    now: chrono::DateTime<Utc>,
) -> Result<checkout_charges::ActiveModel, CheckoutError> {
    let basis = serde_json::to_value(line.basis)
        .map_err(|e| CheckoutError::Database(e.to_string()))?;
    Ok(checkout_charges::ActiveModel {
        id: Set(Uuid::new_v4()),
        checkout_id: Set(checkout_id),
        charge_type_id: Set(line.charge_type_id.into_inner()),
        scope: Set(line.scope.into()),
        order_id: Set(order_id),
        amount_minor: Set(line.signed_amount()),
        currency: Set(currency.code().to_owned()),
        rule_id: Set(Some(line.rule_id.into_inner())),
        basis: Set(basis),
        created_at: Set(now.into()),
    })
}

async fn insert_charge_row<C: ConnectionTrait>(
    conn: &C,
    checkout_id: Uuid,
    order_id: Option<Uuid>,
    line: &ChargeLine,
    currency: Currency,
    now: chrono::DateTime<Utc>,
) -> Result<(), CheckoutError> {
    charge_row(checkout_id, order_id, line, currency, now)?
        .insert(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

pub(crate) fn cart_context(cart: &carts::Model) -> Result<SaleContext, CheckoutError> {
    let discriminant = match cart.context {
        sea_orm_active_enums::SaleContext::Marketplace => "marketplace",
        sea_orm_active_enums::SaleContext::Tenant => "tenant",
    };
    SaleContext::from_parts(discriminant, cart.context_shop_id)
        .map_err(|e| CheckoutError::Database(e.to_string()))
}

pub(crate) fn drafts_from_items(
    items: &[cart_items::Model],
    cart_currency: Currency,
) -> Result<Vec<CartItemDraft>, CheckoutError> {
    items
        .iter()
        .map(|item| {
            let currency = item
                .currency
                .parse::<Currency>()
                .map_err(CheckoutError::Database)?;
            CartItemDraft::new(
                item.product_id,
                ShopId::from_uuid(item.seller_shop_id),
                item.quantity,
                item.unit_price_minor,
                currency,
                cart_currency,
            )
            .map_err(CheckoutError::Cart)
        })
        .collect()
}

/// Moves a checkout along a status edge, inside a caller-owned transaction.
/// A checkout already at `to` passes through (retried webhook deliveries).
pub(crate) async fn transition_in<C: ConnectionTrait>(
    conn: &C,
    checkout_id: CheckoutId,
    from: CheckoutStatus,
    to: CheckoutStatus,
) -> Result<checkouts::Model, CheckoutError> {
    from.transition(to)?;

    let guarded = checkouts::Entity::update_many()
        .col_expr(
            checkouts::Column::Status,
            Expr::value(sea_orm_active_enums::CheckoutStatus::from(to)),
        )
        .col_expr(checkouts::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(checkouts::Column::Id.eq(checkout_id.into_inner()))
        .filter(
            checkouts::Column::Status.eq(sea_orm_active_enums::CheckoutStatus::from(from)),
        )
        .exec(conn)
        .await
        .map_err(db_err)?;

    let checkout = checkouts::Entity::find_by_id(checkout_id.into_inner())
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(CheckoutError::NotFound(checkout_id.into_inner()))?;

    if guarded.rows_affected == 0 {
        let current: CheckoutStatus = checkout.status.into();
        if current == to {
            return Ok(checkout);
        }
        return Err(CheckoutError::InvalidTransition {
            from: current.as_str(),
            to: to.as_str(),
        });
    }

    Ok(checkout)
}

#[cfg(test)]
mod tests {
    use super::*;

    use telar_core::charges::{ChargeBasis, ChargeDirection};
    use telar_shared::types::{ChargeRuleId, ChargeTypeId};

    fn line(direction: ChargeDirection, scope: ChargeScope, amount_minor: i64) -> ChargeLine {
        ChargeLine {
            rule_id: ChargeRuleId::new(),
            charge_type_id: ChargeTypeId::new(),
            scope,
            direction,
            amount_minor,
            basis: ChargeBasis {
                subtotal_minor: 100_000,
                rate_bps: Some(500),
                fixed_minor: None,
            },
        }
    }

    #[test]
    fn subtract_charge_rows_are_stored_negative() {
        let row = charge_row(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            &line(ChargeDirection::Subtract, ChargeScope::Order, 5_000),
            Currency::Cop,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(row.amount_minor.unwrap(), -5_000);
    }

    #[test]
    fn add_charge_rows_are_stored_positive() {
        let row = charge_row(
            Uuid::new_v4(),
            None,
            &line(ChargeDirection::Add, ChargeScope::Checkout, 5_000),
            Currency::Cop,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(row.amount_minor.unwrap(), 5_000);
    }

    #[test]
    fn stored_rows_reconcile_with_the_checkout_totals() {
        // 100000 subtotal with a 5% buyer fee and a 5% seller commission.
        // The signed rows must explain both the charges_total (+5000) and
        // the net deduction (-5000) when summed per scope.
        let checkout_id = Uuid::new_v4();
        let buyer_fee = charge_row(
            checkout_id,
            None,
            &line(ChargeDirection::Add, ChargeScope::Checkout, 5_000),
            Currency::Cop,
            Utc::now(),
        )
        .unwrap();
        let commission = charge_row(
            checkout_id,
            Some(Uuid::new_v4()),
            &line(ChargeDirection::Subtract, ChargeScope::Order, 5_000),
            Currency::Cop,
            Utc::now(),
        )
        .unwrap();

        assert_eq!(buyer_fee.amount_minor.clone().unwrap(), 5_000);
        assert_eq!(
            100_000 + buyer_fee.amount_minor.unwrap(),
            105_000,
            "buyer pays subtotal plus the signed checkout-scope rows"
        );
        assert_eq!(
            100_000 + commission.amount_minor.unwrap(),
            95_000,
            "seller nets subtotal plus the signed order-scope rows"
        );
    }
}
