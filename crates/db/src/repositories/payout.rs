//! Payout repository: atomic balance-check-and-reserve withdrawals.
//!
//! A payout request locks the shop's available account row, derives the
//! balance by summing entries, and posts available → payout_in_transit,
//! all in one transaction. The row lock serializes concurrent requests
//! for the same shop, so two withdrawals can never both pass the check.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use uuid::Uuid;

use telar_core::ledger::{
    AccountKey, EntryLine, LedgerAccountType, Posting, PostingReference, check_available,
};
use telar_core::payout::{PayoutError, PayoutRequest, PayoutStatus};
use telar_shared::types::{Currency, PageRequest, PageResponse, PayoutId, ShopId};

use crate::entities::sea_orm_active_enums;
use crate::entities::{accounts, payouts};
use crate::repositories::account::{get_or_create, sum_entries};
use crate::repositories::posting::post_in;

fn db_err(err: DbErr) -> PayoutError {
    PayoutError::Database(err.to_string())
}

/// Payout repository over `payments.payouts` and the ledger.
#[derive(Debug, Clone)]
pub struct PayoutRepository {
    db: DatabaseConnection,
}

impl PayoutRepository {
    /// Creates a new payout repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Requests a payout: checks the shop's available balance and reserves
    /// the amount in payout_in_transit, atomically. Replaying the same
    /// idempotency key returns the stored payout without moving funds
    /// again.
    ///
    /// # Errors
    ///
    /// `Ledger(InsufficientBalance)` when the available balance cannot
    /// cover the request.
    pub async fn request(&self, request: PayoutRequest) -> Result<payouts::Model, PayoutError> {
        if let Some(stored) = self.find_by_idempotency_key(&request.idempotency_key).await? {
            return Ok(stored);
        }

        let txn = self.db.begin().await.map_err(db_err)?;

        let available_key = AccountKey::shop(
            request.shop_id,
            request.currency,
            LedgerAccountType::Available,
        );
        let account = get_or_create(&txn, &available_key).await?;

        // Serialize concurrent payouts for this shop on the account row.
        accounts::Entity::find_by_id(account.id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?;

        let (balance, _) = sum_entries(&txn, account.id).await?;
        check_available(balance, request.amount_minor)?;

        let now = Utc::now();
        let payout_id = Uuid::new_v4();
        let row = payouts::ActiveModel {
            id: Set(payout_id),
            shop_id: Set(request.shop_id.into_inner()),
            currency: Set(request.currency.code().to_owned()),
            amount_minor: Set(request.amount_minor),
            status: Set(sea_orm_active_enums::PayoutStatus::Requested),
            external_payout_id: Set(None),
            destination: Set(request.destination.clone()),
            idempotency_key: Set(request.idempotency_key.clone()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let payout = match row.insert(&txn).await {
            Ok(model) => model,
            Err(err) => {
                txn.rollback().await.map_err(db_err)?;
                // Lost the idempotency race; the winner reserved the funds.
                if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    return self
                        .find_by_idempotency_key(&request.idempotency_key)
                        .await?
                        .ok_or_else(|| {
                            PayoutError::Database("conflicting payout vanished".to_owned())
                        });
                }
                return Err(db_err(err));
            }
        };

        let posting = Posting::new(
            PostingReference::Payout(payout.id),
            format!("payout-{}", payout.id),
            request.currency,
            Some(format!("Payout request {}", payout.id)),
            vec![
                EntryLine::new(available_key, -request.amount_minor)
                    .with_metadata(serde_json::json!({ "payout_id": payout.id })),
                EntryLine::new(
                    AccountKey::shop(
                        request.shop_id,
                        request.currency,
                        LedgerAccountType::PayoutInTransit,
                    ),
                    request.amount_minor,
                )
                .with_metadata(serde_json::json!({ "payout_id": payout.id })),
            ],
        )?;
        post_in(&txn, &posting).await?;

        PayoutStatus::Requested.transition(PayoutStatus::Processing)?;
        let mut active: payouts::ActiveModel = payout.into();
        active.status = Set(sea_orm_active_enums::PayoutStatus::Processing);
        active.updated_at = Set(Utc::now().into());
        let payout = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(payout)
    }

    /// Confirms a payout the provider reports as paid: settles the
    /// in-transit reservation against platform clearing. Replay-safe.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the payout is processing (or already
    /// paid, which is a no-op).
    pub async fn confirm(
        &self,
        payout_id: PayoutId,
        external_payout_id: Option<String>,
    ) -> Result<payouts::Model, PayoutError> {
        self.settle(
            payout_id,
            PayoutStatus::Paid,
            external_payout_id,
            |payout, currency, shop| {
                Posting::new(
                    PostingReference::PayoutSettlement(payout.id),
                    format!("payout-settle-{}", payout.id),
                    currency,
                    Some(format!("Settlement of payout {}", payout.id)),
                    vec![
                        EntryLine::new(
                            AccountKey::shop(shop, currency, LedgerAccountType::PayoutInTransit),
                            -payout.amount_minor,
                        ),
                        EntryLine::new(
                            AccountKey::platform(currency, LedgerAccountType::Clearing),
                            payout.amount_minor,
                        ),
                    ],
                )
            },
        )
        .await
    }

    /// Marks a payout failed: returns the reserved funds to the shop's
    /// available balance. Replay-safe.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` unless the payout is processing (or already
    /// failed, which is a no-op).
    pub async fn fail(&self, payout_id: PayoutId) -> Result<payouts::Model, PayoutError> {
        self.settle(payout_id, PayoutStatus::Failed, None, |payout, currency, shop| {
            Posting::new(
                PostingReference::PayoutFailure(payout.id),
                format!("payout-fail-{}", payout.id),
                currency,
                Some(format!("Failure of payout {}", payout.id)),
                vec![
                    EntryLine::new(
                        AccountKey::shop(shop, currency, LedgerAccountType::PayoutInTransit),
                        -payout.amount_minor,
                    ),
                    EntryLine::new(
                        AccountKey::shop(shop, currency, LedgerAccountType::Available),
                        payout.amount_minor,
                    ),
                ],
            )
        })
        .await
    }

    /// Loads a payout by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn get(&self, payout_id: PayoutId) -> Result<payouts::Model, PayoutError> {
        payouts::Entity::find_by_id(payout_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PayoutError::NotFound(payout_id.into_inner()))
    }

    /// Lists a shop's payouts, newest first.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn list_for_shop(
        &self,
        shop_id: ShopId,
        page: &PageRequest,
    ) -> Result<PageResponse<payouts::Model>, PayoutError> {
        let query = payouts::Entity::find()
            .filter(payouts::Column::ShopId.eq(shop_id.into_inner()))
            .order_by_desc(payouts::Column::CreatedAt);

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(PageResponse::new(rows, page.page, page.per_page, total))
    }

    async fn find_by_idempotency_key(
        &self,
        idempotency_key: &str,
    ) -> Result<Option<payouts::Model>, PayoutError> {
        payouts::Entity::find()
            .filter(payouts::Column::IdempotencyKey.eq(idempotency_key))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Shared terminal transition: lock the payout, post the settlement or
    /// reversal, flip the status. A payout already at `to` is a replay.
    async fn settle<F>(
        &self,
        payout_id: PayoutId,
        to: PayoutStatus,
        external_payout_id: Option<String>,
        build_posting: F,
    ) -> Result<payouts::Model, PayoutError>
    where
        F: FnOnce(&payouts::Model, Currency, ShopId) -> Result<Posting, telar_core::ledger::LedgerError>,
    {
        let txn = self.db.begin().await.map_err(db_err)?;

        let payout = payouts::Entity::find_by_id(payout_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(PayoutError::NotFound(payout_id.into_inner()))?;

        let status: PayoutStatus = payout.status.into();
        if status == to {
            txn.commit().await.map_err(db_err)?;
            return Ok(payout);
        }
        status.transition(to)?;

        let currency = payout
            .currency
            .parse::<Currency>()
            .map_err(PayoutError::Database)?;
        let shop = ShopId::from_uuid(payout.shop_id);

        let posting = build_posting(&payout, currency, shop)?;
        post_in(&txn, &posting).await?;

        let mut active: payouts::ActiveModel = payout.into();
        active.status = Set(to.into());
        if external_payout_id.is_some() {
            active.external_payout_id = Set(external_payout_id);
        }
        active.updated_at = Set(Utc::now().into());
        let payout = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(payout)
    }
}
