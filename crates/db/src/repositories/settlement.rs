//! Settlement repository: releasing seller funds on delivery.
//!
//! Delivery is the moment a seller's money stops being contingent: the
//! order flips to delivered and the net amount moves pending → available
//! in the same transaction, referenced by the order id so a replayed
//! delivery confirmation posts nothing twice.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, QuerySelect, Set, TransactionTrait,
};

use telar_core::checkout::{CheckoutError, OrderStatus};
use telar_core::ledger::{AccountKey, EntryLine, LedgerAccountType, Posting, PostingReference};
use telar_shared::types::{Currency, OrderId, ShopId};

use crate::entities::sea_orm_active_enums;
use crate::entities::orders;
use crate::repositories::posting::post_in;

fn db_err(err: DbErr) -> CheckoutError {
    CheckoutError::Database(err.to_string())
}

/// Settlement repository over `payments.orders` and the ledger.
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    db: DatabaseConnection,
}

impl SettlementRepository {
    /// Creates a new settlement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Marks an order delivered and releases the seller's net from
    /// pending to available. Replay-safe: an order already delivered is
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown order, `InvalidTransition` when the
    /// order is not pending fulfillment, ledger errors from the release
    /// posting.
    pub async fn mark_delivered(&self, order_id: OrderId) -> Result<orders::Model, CheckoutError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let order = orders::Entity::find_by_id(order_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(CheckoutError::NotFound(order_id.into_inner()))?;

        let status: OrderStatus = order.status.into();
        if status == OrderStatus::Delivered {
            txn.commit().await.map_err(db_err)?;
            return Ok(order);
        }
        status.transition(OrderStatus::Delivered)?;

        if order.net_to_seller_minor != 0 {
            let currency = order
                .currency
                .parse::<Currency>()
                .map_err(CheckoutError::Database)?;
            let shop = ShopId::from_uuid(order.seller_shop_id);

            let posting = Posting::new(
                PostingReference::PendingRelease(order.id),
                format!("pending-release-{}", order.id),
                currency,
                Some(format!("Pending release for order {}", order.id)),
                vec![
                    EntryLine::new(
                        AccountKey::shop(shop, currency, LedgerAccountType::Pending),
                        -order.net_to_seller_minor,
                    )
                    .with_metadata(serde_json::json!({ "order_id": order.id })),
                    EntryLine::new(
                        AccountKey::shop(shop, currency, LedgerAccountType::Available),
                        order.net_to_seller_minor,
                    )
                    .with_metadata(serde_json::json!({ "order_id": order.id })),
                ],
            )?;
            post_in(&txn, &posting).await?;
        }

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(sea_orm_active_enums::OrderStatus::Delivered);
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(order)
    }

    /// Cancels an order that has not shipped. No ledger movement; the
    /// seller's net stays in pending until the refund path claims it.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown order, `InvalidTransition` when the
    /// order already left pending fulfillment.
    pub async fn cancel(&self, order_id: OrderId) -> Result<orders::Model, CheckoutError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let order = orders::Entity::find_by_id(order_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(CheckoutError::NotFound(order_id.into_inner()))?;

        let status: OrderStatus = order.status.into();
        if status == OrderStatus::Canceled {
            txn.commit().await.map_err(db_err)?;
            return Ok(order);
        }
        status.transition(OrderStatus::Canceled)?;

        let mut active: orders::ActiveModel = order.into();
        active.status = Set(sea_orm_active_enums::OrderStatus::Canceled);
        active.updated_at = Set(Utc::now().into());
        let order = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(order)
    }
}
