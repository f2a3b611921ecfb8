//! Cart repository: item mutations under optimistic version locking.
//!
//! Every mutation is a compare-and-swap on the cart's `version` column:
//! `UPDATE .. SET version = version + 1 WHERE id = ? AND version = ? AND
//! status = 'open'`. Zero rows affected means the cart is gone, not open,
//! or stale; the reload afterwards tells the three apart.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use serde::Serialize;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use telar_core::cart::{AbandonOutcome, CartError, CartItemDraft, CartStatus};
use telar_core::context::SaleContext;
use telar_shared::types::{CartId, CartItemId, Currency, MinorAmount, ShopId, UserId};

use crate::entities::sea_orm_active_enums;
use crate::entities::{cart_items, carts};

fn db_err(err: DbErr) -> CartError {
    CartError::Database(err.to_string())
}

/// Input for creating a cart.
#[derive(Debug, Clone)]
pub struct NewCart {
    /// The buyer the cart belongs to.
    pub buyer_user_id: UserId,
    /// Sale context the cart shops in.
    pub context: SaleContext,
    /// Currency every item must share.
    pub currency: Currency,
}

/// Input for adding an item to a cart. The price fields are the output of
/// price resolution, frozen onto the item row.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    /// Product being added.
    pub product_id: Uuid,
    /// Shop that sells the product.
    pub seller_shop_id: ShopId,
    /// Units requested.
    pub quantity: i32,
    /// Resolved unit price, minor units.
    pub unit_price_minor: MinorAmount,
    /// Currency of the resolved price.
    pub currency: Currency,
    /// Where the price came from (`product_base` / `override`).
    pub price_source: String,
    /// The price row the unit price was resolved from, when known.
    pub price_ref_id: Option<Uuid>,
}

/// A cart with its items.
#[derive(Debug, Clone, Serialize)]
pub struct CartWithItems {
    /// The cart row.
    pub cart: carts::Model,
    /// Item rows in insertion order.
    pub items: Vec<cart_items::Model>,
}

/// Cart repository over `payments.carts` and `payments.cart_items`.
#[derive(Debug, Clone)]
pub struct CartRepository {
    db: DatabaseConnection,
}

impl CartRepository {
    /// Creates a new cart repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an open, empty cart at version 1.
    ///
    /// # Errors
    ///
    /// Returns a database error on insert failure.
    pub async fn create(&self, input: NewCart) -> Result<carts::Model, CartError> {
        let now = Utc::now();
        let row = carts::ActiveModel {
            id: Set(Uuid::new_v4()),
            buyer_user_id: Set(input.buyer_user_id.into_inner()),
            context: Set(context_column(input.context)),
            context_shop_id: Set(input.context.context_shop_id()),
            currency: Set(input.currency.code().to_owned()),
            status: Set(sea_orm_active_enums::CartStatus::Open),
            version: Set(1),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            locked_at: Set(None),
            converted_at: Set(None),
        };
        row.insert(&self.db).await.map_err(db_err)
    }

    /// Loads a cart with its items.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown cart id.
    pub async fn get(&self, cart_id: CartId) -> Result<CartWithItems, CartError> {
        load_cart_with_items(&self.db, cart_id).await
    }

    /// Adds an item to an open cart. Adding the same product again merges
    /// into the existing row: quantities accumulate, the unit price is
    /// refreshed to the latest resolution.
    ///
    /// # Errors
    ///
    /// `VersionConflict` when `expected_version` is stale, `NotOpen` when
    /// the cart no longer accepts mutations, plus draft validation errors.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        expected_version: i32,
        input: NewCartItem,
    ) -> Result<CartWithItems, CartError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let cart = bump_version(&txn, cart_id, expected_version).await?;
        let cart_currency = cart_currency(&cart)?;

        // Validation covers quantity, negative price and currency agreement.
        CartItemDraft::new(
            input.product_id,
            input.seller_shop_id,
            input.quantity,
            input.unit_price_minor,
            input.currency,
            cart_currency,
        )?;

        let existing = cart_items::Entity::find()
            .filter(cart_items::Column::CartId.eq(cart_id.into_inner()))
            .filter(cart_items::Column::ProductId.eq(input.product_id))
            .one(&txn)
            .await
            .map_err(db_err)?;

        let now = Utc::now();
        match existing {
            Some(item) => {
                let merged_quantity = item
                    .quantity
                    .checked_add(input.quantity)
                    .ok_or(CartError::AmountOverflow)?;
                let mut active: cart_items::ActiveModel = item.into();
                active.quantity = Set(merged_quantity);
                active.unit_price_minor = Set(input.unit_price_minor);
                active.price_source = Set(input.price_source);
                active.price_ref_id = Set(input.price_ref_id);
                active.updated_at = Set(now.into());
                active.update(&txn).await.map_err(db_err)?;
            }
            None => {
                let row = cart_items::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    cart_id: Set(cart_id.into_inner()),
                    product_id: Set(input.product_id),
                    seller_shop_id: Set(input.seller_shop_id.into_inner()),
                    quantity: Set(input.quantity),
                    currency: Set(input.currency.code().to_owned()),
                    unit_price_minor: Set(input.unit_price_minor),
                    price_source: Set(input.price_source),
                    price_ref_id: Set(input.price_ref_id),
                    metadata: Set(serde_json::Value::Object(serde_json::Map::new())),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                row.insert(&txn).await.map_err(db_err)?;
            }
        }

        txn.commit().await.map_err(db_err)?;
        load_cart_with_items(&self.db, cart_id).await
    }

    /// Changes an item's quantity.
    ///
    /// # Errors
    ///
    /// `InvalidQuantity` for non-positive values; `NotFound` when the item
    /// is not in this cart; the usual version and status errors.
    pub async fn update_item_quantity(
        &self,
        cart_id: CartId,
        expected_version: i32,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<CartWithItems, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let txn = self.db.begin().await.map_err(db_err)?;
        bump_version(&txn, cart_id, expected_version).await?;

        let updated = cart_items::Entity::update_many()
            .col_expr(cart_items::Column::Quantity, Expr::value(quantity))
            .col_expr(cart_items::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(cart_items::Column::Id.eq(item_id.into_inner()))
            .filter(cart_items::Column::CartId.eq(cart_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if updated.rows_affected == 0 {
            return Err(CartError::NotFound(item_id.into_inner()));
        }

        txn.commit().await.map_err(db_err)?;
        load_cart_with_items(&self.db, cart_id).await
    }

    /// Removes an item. Removing an item that is already gone still bumps
    /// the version and succeeds.
    ///
    /// # Errors
    ///
    /// The usual version and status errors.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        expected_version: i32,
        item_id: CartItemId,
    ) -> Result<CartWithItems, CartError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        bump_version(&txn, cart_id, expected_version).await?;

        cart_items::Entity::delete_many()
            .filter(cart_items::Column::Id.eq(item_id.into_inner()))
            .filter(cart_items::Column::CartId.eq(cart_id.into_inner()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        load_cart_with_items(&self.db, cart_id).await
    }

    /// Abandons a cart. Idempotent: carts already terminal are a no-op.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown cart id.
    pub async fn abandon(&self, cart_id: CartId) -> Result<AbandonOutcome, CartError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        // Row lock so a racing checkout cannot change the status between
        // the read and the write.
        let cart = carts::Entity::find_by_id(cart_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(CartError::NotFound(cart_id.into_inner()))?;

        let status: CartStatus = cart.status.into();
        if status.try_abandon() == AbandonOutcome::NoOp {
            txn.commit().await.map_err(db_err)?;
            return Ok(AbandonOutcome::NoOp);
        }

        let mut active: carts::ActiveModel = cart.into();
        active.status = Set(sea_orm_active_enums::CartStatus::Abandoned);
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(AbandonOutcome::Abandoned)
    }
}

fn context_column(context: SaleContext) -> sea_orm_active_enums::SaleContext {
    match context {
        SaleContext::Marketplace => sea_orm_active_enums::SaleContext::Marketplace,
        SaleContext::Tenant(_) => sea_orm_active_enums::SaleContext::Tenant,
    }
}

pub(crate) fn cart_currency(cart: &carts::Model) -> Result<Currency, CartError> {
    cart.currency
        .parse::<Currency>()
        .map_err(CartError::Database)
}

async fn find_cart<C: ConnectionTrait>(
    conn: &C,
    cart_id: CartId,
) -> Result<Option<carts::Model>, CartError> {
    carts::Entity::find_by_id(cart_id.into_inner())
        .one(conn)
        .await
        .map_err(db_err)
}

async fn load_cart_with_items<C: ConnectionTrait>(
    conn: &C,
    cart_id: CartId,
) -> Result<CartWithItems, CartError> {
    let cart = find_cart(conn, cart_id)
        .await?
        .ok_or(CartError::NotFound(cart_id.into_inner()))?;
    let items = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id.into_inner()))
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(db_err)?;
    Ok(CartWithItems { cart, items })
}

/// The version CAS every mutation starts with. Returns the cart as it is
/// after the bump.
async fn bump_version<C: ConnectionTrait>(
    conn: &C,
    cart_id: CartId,
    expected_version: i32,
) -> Result<carts::Model, CartError> {
    let bumped = carts::Entity::update_many()
        .col_expr(
            carts::Column::Version,
            Expr::col(carts::Column::Version).add(1),
        )
        .col_expr(carts::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(carts::Column::Id.eq(cart_id.into_inner()))
        .filter(carts::Column::Version.eq(expected_version))
        .filter(carts::Column::Status.eq(sea_orm_active_enums::CartStatus::Open))
        .exec(conn)
        .await
        .map_err(db_err)?;

    let cart = find_cart(conn, cart_id)
        .await?
        .ok_or(CartError::NotFound(cart_id.into_inner()))?;

    if bumped.rows_affected == 0 {
        let status: CartStatus = cart.status.into();
        if !status.accepts_mutations() {
            return Err(CartError::NotOpen {
                status: status.as_str(),
            });
        }
        return Err(CartError::VersionConflict {
            expected: expected_version,
            actual: cart.version,
        });
    }

    Ok(cart)
}

/// Moves a cart along a status edge, inside a caller-owned transaction.
///
/// Lost guarded updates are re-read: if the cart already sits at `to`
/// (a retried request), the transition is treated as done.
pub(crate) async fn transition_in<C: ConnectionTrait>(
    conn: &C,
    cart_id: CartId,
    from: CartStatus,
    to: CartStatus,
) -> Result<carts::Model, CartError> {
    from.transition(to)?;

    let now = Utc::now();
    let mut update = carts::Entity::update_many()
        .col_expr(
            carts::Column::Status,
            Expr::value(sea_orm_active_enums::CartStatus::from(to)),
        )
        .col_expr(carts::Column::UpdatedAt, Expr::value(now))
        .filter(carts::Column::Id.eq(cart_id.into_inner()))
        .filter(
            carts::Column::Status.eq(sea_orm_active_enums::CartStatus::from(from)),
        );
    update = match to {
        CartStatus::Locked => update.col_expr(carts::Column::LockedAt, Expr::value(Some(now))),
        CartStatus::Converted => {
            update.col_expr(carts::Column::ConvertedAt, Expr::value(Some(now)))
        }
        CartStatus::Open | CartStatus::Abandoned => update,
    };

    let guarded = update.exec(conn).await.map_err(db_err)?;

    let cart = find_cart(conn, cart_id)
        .await?
        .ok_or(CartError::NotFound(cart_id.into_inner()))?;

    if guarded.rows_affected == 0 {
        let current: CartStatus = cart.status.into();
        if current == to {
            return Ok(cart);
        }
        return Err(CartError::InvalidTransition {
            from: current.as_str(),
            to: to.as_str(),
        });
    }

    Ok(cart)
}
