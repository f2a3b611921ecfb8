//! Payment repository: intents, attempts and the capture flow.
//!
//! A succeeded intent is the money moment: inside one transaction the
//! intent flips to succeeded, the capture posting lands in the ledger,
//! the checkout becomes paid and the cart converts. A failed intent
//! unwinds the same chain: checkout failed, cart unlocked back to open.

use chrono::Utc;
use serde::Serialize;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use telar_core::cart::CartStatus;
use telar_core::checkout::CheckoutStatus;
use telar_core::ledger::{AccountKey, EntryLine, LedgerAccountType, Posting, PostingReference};
use telar_core::payment::{
    PaymentAttemptStatus, PaymentError, PaymentIntentStatus, next_attempt_number,
};
use telar_shared::types::{CartId, CheckoutId, Currency, PaymentAttemptId, PaymentIntentId, ShopId};

use crate::entities::sea_orm_active_enums;
use crate::entities::{checkouts, orders, payment_attempts, payment_intents, payment_providers};
use crate::repositories::cart::transition_in as cart_transition_in;
use crate::repositories::checkout::transition_in as checkout_transition_in;
use crate::repositories::posting::post_in;

fn db_err(err: DbErr) -> PaymentError {
    PaymentError::Database(err.to_string())
}

/// Input for creating a payment intent.
#[derive(Debug, Clone)]
pub struct CreateIntent {
    /// The checkout being paid.
    pub checkout_id: CheckoutId,
    /// Provider code (`wompi`, `stripe`, ...).
    pub provider_code: String,
}

/// Input for recording a payment attempt under an intent.
#[derive(Debug, Clone)]
pub struct RecordAttempt {
    /// The intent the attempt belongs to.
    pub intent_id: PaymentIntentId,
    /// Client-supplied replay token, unique across attempts.
    pub idempotency_key: String,
    /// The request as sent to the provider, for the audit trail.
    pub request_payload: serde_json::Value,
}

/// An intent with its attempts in attempt order.
#[derive(Debug, Clone, Serialize)]
pub struct IntentWithAttempts {
    /// The intent row.
    pub intent: payment_intents::Model,
    /// Attempt rows, ordered by attempt number.
    pub attempts: Vec<payment_attempts::Model>,
}

/// Payment repository over intents, attempts and providers.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds or creates a payment provider by its unique code.
    ///
    /// # Errors
    ///
    /// Returns a database error on query failure.
    pub async fn ensure_provider(
        &self,
        code: &str,
        display_name: &str,
        capabilities: serde_json::Value,
    ) -> Result<payment_providers::Model, PaymentError> {
        if let Some(existing) = find_provider(&self.db, code).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let row = payment_providers::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code.to_owned()),
            display_name: Set(display_name.to_owned()),
            is_active: Set(true),
            capabilities: Set(capabilities),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        match row.insert(&self.db).await {
            Ok(model) => Ok(model),
            Err(_) => find_provider(&self.db, code)
                .await?
                .ok_or_else(|| PaymentError::ProviderNotFound(code.to_owned())),
        }
    }

    /// Creates an intent for a checkout and moves the checkout to
    /// awaiting payment. The intent amount is the checkout's total.
    ///
    /// # Errors
    ///
    /// `ProviderNotFound` for an unknown or inactive provider code, plus
    /// checkout transition errors.
    pub async fn create_intent(
        &self,
        input: CreateIntent,
    ) -> Result<payment_intents::Model, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let provider = find_provider(&txn, &input.provider_code)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| PaymentError::ProviderNotFound(input.provider_code.clone()))?;

        let checkout = checkout_transition_in(
            &txn,
            input.checkout_id,
            CheckoutStatus::Created,
            CheckoutStatus::AwaitingPayment,
        )
        .await?;

        let now = Utc::now();
        let intent = payment_intents::ActiveModel {
            id: Set(Uuid::new_v4()),
            checkout_id: Set(checkout.id),
            provider_id: Set(provider.id),
            currency: Set(checkout.currency.clone()),
            amount_minor: Set(checkout.total_minor),
            status: Set(sea_orm_active_enums::PaymentIntentStatus::RequiresPaymentMethod),
            external_intent_id: Set(None),
            provider_data: Set(serde_json::Value::Object(serde_json::Map::new())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let intent = intent.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(intent)
    }

    /// Records an attempt under an intent. Replaying an idempotency key
    /// returns the stored attempt; reusing it under another intent is
    /// rejected.
    ///
    /// # Errors
    ///
    /// `IntentTerminal` once the intent is settled; `DuplicateIdempotencyKey`
    /// for a key already spent on another intent.
    pub async fn record_attempt(
        &self,
        input: RecordAttempt,
    ) -> Result<payment_attempts::Model, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(stored) = payment_attempts::Entity::find()
            .filter(payment_attempts::Column::IdempotencyKey.eq(input.idempotency_key.as_str()))
            .one(&txn)
            .await
            .map_err(db_err)?
        {
            if stored.payment_intent_id == input.intent_id.into_inner() {
                txn.commit().await.map_err(db_err)?;
                return Ok(stored);
            }
            return Err(PaymentError::DuplicateIdempotencyKey(input.idempotency_key));
        }

        let intent = find_intent_locked(&txn, input.intent_id).await?;
        let status: PaymentIntentStatus = intent.status.into();
        if status.is_terminal() {
            return Err(PaymentError::IntentTerminal {
                intent_id: intent.id,
                status: status.as_str(),
            });
        }

        let max_no: Option<i32> = payment_attempts::Entity::find()
            .filter(payment_attempts::Column::PaymentIntentId.eq(intent.id))
            .select_only()
            .column_as(payment_attempts::Column::AttemptNo.max(), "max_no")
            .into_tuple()
            .one(&txn)
            .await
            .map_err(db_err)?
            .flatten();

        let attempt = payment_attempts::ActiveModel {
            id: Set(Uuid::new_v4()),
            payment_intent_id: Set(intent.id),
            attempt_no: Set(next_attempt_number(max_no)),
            status: Set(sea_orm_active_enums::PaymentAttemptStatus::Created),
            idempotency_key: Set(input.idempotency_key),
            request_payload: Set(input.request_payload),
            response_payload: Set(serde_json::Value::Object(serde_json::Map::new())),
            error_message: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let attempt = attempt.insert(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(attempt)
    }

    /// Advances an attempt along its status machine, mirroring the step
    /// onto the intent (redirected → requires action, authorized →
    /// processing).
    ///
    /// # Errors
    ///
    /// `AttemptNotFound` or an invalid transition.
    pub async fn update_attempt_status(
        &self,
        attempt_id: PaymentAttemptId,
        to: PaymentAttemptStatus,
        response_payload: Option<serde_json::Value>,
        error_message: Option<String>,
    ) -> Result<payment_attempts::Model, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let attempt = payment_attempts::Entity::find_by_id(attempt_id.into_inner())
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::AttemptNotFound(attempt_id.into_inner()))?;

        let current: PaymentAttemptStatus = attempt.status.into();
        current.transition(to)?;

        let intent_id = PaymentIntentId::from_uuid(attempt.payment_intent_id);
        let mut active: payment_attempts::ActiveModel = attempt.into();
        active.status = Set(to.into());
        if let Some(payload) = response_payload {
            active.response_payload = Set(payload);
        }
        if let Some(message) = error_message {
            active.error_message = Set(Some(message));
        }
        let attempt = active.update(&txn).await.map_err(db_err)?;

        let mirrored = match to {
            PaymentAttemptStatus::Redirected => Some(PaymentIntentStatus::RequiresAction),
            PaymentAttemptStatus::Authorized => Some(PaymentIntentStatus::Processing),
            _ => None,
        };
        if let Some(intent_to) = mirrored {
            advance_intent(&txn, intent_id, intent_to).await?;
        }

        txn.commit().await.map_err(db_err)?;
        Ok(attempt)
    }

    /// Settles an intent as succeeded: capture posting, checkout paid,
    /// cart converted, attempt captured. Safe to replay; a second webhook
    /// delivery finds the intent already succeeded and changes nothing.
    ///
    /// # Errors
    ///
    /// Transition errors when the intent is not processing, ledger errors
    /// when the capture posting is rejected.
    pub async fn mark_intent_succeeded(
        &self,
        intent_id: PaymentIntentId,
        attempt_id: PaymentAttemptId,
        external_intent_id: Option<String>,
    ) -> Result<payment_intents::Model, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let intent = find_intent_locked(&txn, intent_id).await?;
        let status: PaymentIntentStatus = intent.status.into();
        if status == PaymentIntentStatus::Succeeded {
            txn.commit().await.map_err(db_err)?;
            return Ok(intent);
        }
        status.transition(PaymentIntentStatus::Succeeded)?;

        let attempt = payment_attempts::Entity::find_by_id(attempt_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::AttemptNotFound(attempt_id.into_inner()))?;
        let attempt_status: PaymentAttemptStatus = attempt.status.into();
        attempt_status.transition(PaymentAttemptStatus::Captured)?;
        let mut active: payment_attempts::ActiveModel = attempt.into();
        active.status = Set(sea_orm_active_enums::PaymentAttemptStatus::Captured);
        active.update(&txn).await.map_err(db_err)?;

        let checkout_id = CheckoutId::from_uuid(intent.checkout_id);
        let checkout = checkouts::Entity::find_by_id(intent.checkout_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::Checkout(telar_core::checkout::CheckoutError::NotFound(
                intent.checkout_id,
            )))?;
        let order_rows = orders::Entity::find()
            .filter(orders::Column::CheckoutId.eq(checkout.id))
            .order_by_asc(orders::Column::CreatedAt)
            .all(&txn)
            .await
            .map_err(db_err)?;

        let posting = capture_posting(&checkout, &order_rows)?;
        post_in(&txn, &posting).await?;

        checkout_transition_in(
            &txn,
            checkout_id,
            CheckoutStatus::AwaitingPayment,
            CheckoutStatus::Paid,
        )
        .await?;
        cart_transition_in(
            &txn,
            CartId::from_uuid(checkout.cart_id),
            CartStatus::Locked,
            CartStatus::Converted,
        )
        .await?;

        let mut active: payment_intents::ActiveModel = intent.into();
        active.status = Set(sea_orm_active_enums::PaymentIntentStatus::Succeeded);
        if external_intent_id.is_some() {
            active.external_intent_id = Set(external_intent_id);
        }
        active.updated_at = Set(Utc::now().into());
        let intent = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(intent)
    }

    /// Settles an intent as failed: attempt failed, checkout failed, cart
    /// unlocked back to open for another try. No ledger movement; nothing
    /// was captured.
    ///
    /// # Errors
    ///
    /// Transition errors when the intent is already settled otherwise.
    pub async fn mark_intent_failed(
        &self,
        intent_id: PaymentIntentId,
        error_message: Option<String>,
    ) -> Result<payment_intents::Model, PaymentError> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let intent = find_intent_locked(&txn, intent_id).await?;
        let status: PaymentIntentStatus = intent.status.into();
        if status == PaymentIntentStatus::Failed {
            txn.commit().await.map_err(db_err)?;
            return Ok(intent);
        }
        status.transition(PaymentIntentStatus::Failed)?;

        // Fail whatever attempt is still in flight.
        let open_attempts = payment_attempts::Entity::find()
            .filter(payment_attempts::Column::PaymentIntentId.eq(intent.id))
            .order_by_asc(payment_attempts::Column::AttemptNo)
            .all(&txn)
            .await
            .map_err(db_err)?;
        for attempt in open_attempts {
            let attempt_status: PaymentAttemptStatus = attempt.status.into();
            if attempt_status.is_terminal() {
                continue;
            }
            let mut active: payment_attempts::ActiveModel = attempt.into();
            active.status = Set(sea_orm_active_enums::PaymentAttemptStatus::Failed);
            if let Some(message) = error_message.clone() {
                active.error_message = Set(Some(message));
            }
            active.update(&txn).await.map_err(db_err)?;
        }

        let checkout = checkout_transition_in(
            &txn,
            CheckoutId::from_uuid(intent.checkout_id),
            CheckoutStatus::AwaitingPayment,
            CheckoutStatus::Failed,
        )
        .await?;
        cart_transition_in(
            &txn,
            CartId::from_uuid(checkout.cart_id),
            CartStatus::Locked,
            CartStatus::Open,
        )
        .await?;

        let mut active: payment_intents::ActiveModel = intent.into();
        active.status = Set(sea_orm_active_enums::PaymentIntentStatus::Failed);
        active.updated_at = Set(Utc::now().into());
        let intent = active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;
        Ok(intent)
    }

    /// Loads an intent with its attempts.
    ///
    /// # Errors
    ///
    /// `IntentNotFound` for an unknown id.
    pub async fn get_intent(
        &self,
        intent_id: PaymentIntentId,
    ) -> Result<IntentWithAttempts, PaymentError> {
        let intent = payment_intents::Entity::find_by_id(intent_id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(PaymentError::IntentNotFound(intent_id.into_inner()))?;

        let attempts = payment_attempts::Entity::find()
            .filter(payment_attempts::Column::PaymentIntentId.eq(intent.id))
            .order_by_asc(payment_attempts::Column::AttemptNo)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(IntentWithAttempts { intent, attempts })
    }
}

async fn find_provider<C: ConnectionTrait>(
    conn: &C,
    code: &str,
) -> Result<Option<payment_providers::Model>, PaymentError> {
    payment_providers::Entity::find()
        .filter(payment_providers::Column::Code.eq(code))
        .one(conn)
        .await
        .map_err(db_err)
}

async fn find_intent_locked<C: ConnectionTrait>(
    conn: &C,
    intent_id: PaymentIntentId,
) -> Result<payment_intents::Model, PaymentError> {
    payment_intents::Entity::find_by_id(intent_id.into_inner())
        .lock_exclusive()
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(PaymentError::IntentNotFound(intent_id.into_inner()))
}

/// Moves an intent forward if the edge exists; an intent already at the
/// target passes through (attempt updates can arrive out of order).
async fn advance_intent<C: ConnectionTrait>(
    conn: &C,
    intent_id: PaymentIntentId,
    to: PaymentIntentStatus,
) -> Result<(), PaymentError> {
    let intent = find_intent_locked(conn, intent_id).await?;
    let current: PaymentIntentStatus = intent.status.into();
    if current == to {
        return Ok(());
    }
    current.transition(to)?;

    let mut active: payment_intents::ActiveModel = intent.into();
    active.status = Set(to.into());
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await.map_err(db_err)?;
    Ok(())
}

/// Builds the capture posting for a paid checkout.
///
/// Clearing takes the buyer's full total; each seller's pending account
/// takes their net; the platform revenue account takes the remainder.
/// `Posting::new` re-validates that the three legs balance.
fn capture_posting(
    checkout: &checkouts::Model,
    order_rows: &[orders::Model],
) -> Result<Posting, PaymentError> {
    let currency = checkout
        .currency
        .parse::<Currency>()
        .map_err(PaymentError::Database)?;

    let mut entries = vec![
        EntryLine::new(
            AccountKey::platform(currency, LedgerAccountType::Clearing),
            -checkout.total_minor,
        )
        .with_metadata(serde_json::json!({ "checkout_id": checkout.id })),
    ];

    let mut nets: i128 = 0;
    for order in order_rows {
        nets += i128::from(order.net_to_seller_minor);
        if order.net_to_seller_minor != 0 {
            entries.push(
                EntryLine::new(
                    AccountKey::shop(
                        ShopId::from_uuid(order.seller_shop_id),
                        currency,
                        LedgerAccountType::Pending,
                    ),
                    order.net_to_seller_minor,
                )
                .with_metadata(serde_json::json!({ "order_id": order.id })),
            );
        }
    }

    let platform_cut = i128::from(checkout.total_minor) - nets;
    if platform_cut != 0 {
        let platform_cut = i64::try_from(platform_cut)
            .map_err(|_| PaymentError::Database("platform cut overflows i64".to_owned()))?;
        entries.push(
            EntryLine::new(
                AccountKey::platform(currency, LedgerAccountType::Revenue),
                platform_cut,
            )
            .with_metadata(serde_json::json!({ "checkout_id": checkout.id })),
        );
    }

    let posting = Posting::new(
        PostingReference::Checkout(checkout.id),
        format!("checkout-capture-{}", checkout.id),
        currency,
        Some(format!("Capture of checkout {}", checkout.id)),
        entries,
    )?;
    Ok(posting)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkout(total_minor: i64) -> checkouts::Model {
        let now = Utc::now();
        checkouts::Model {
            id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            buyer_user_id: Uuid::new_v4(),
            context: sea_orm_active_enums::SaleContext::Marketplace,
            context_shop_id: None,
            currency: "COP".to_owned(),
            status: sea_orm_active_enums::CheckoutStatus::AwaitingPayment,
            subtotal_minor: total_minor,
            charges_total_minor: 0,
            total_minor,
            idempotency_key: "checkout-test".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn order(checkout_id: Uuid, net_minor: i64) -> orders::Model {
        let now = Utc::now();
        orders::Model {
            id: Uuid::new_v4(),
            checkout_id,
            seller_shop_id: Uuid::new_v4(),
            currency: "COP".to_owned(),
            gross_subtotal_minor: net_minor,
            net_to_seller_minor: net_minor,
            status: sea_orm_active_enums::OrderStatus::PendingFulfillment,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn capture_splits_total_into_net_and_platform_cut() {
        let checkout = checkout(105_000);
        let orders = vec![order(checkout.id, 100_000)];

        let posting = capture_posting(&checkout, &orders).unwrap();
        let entries = posting.entries();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].amount_minor, -105_000);
        assert_eq!(entries[1].amount_minor, 100_000);
        assert_eq!(entries[2].amount_minor, 5_000);
        assert_eq!(
            entries.iter().map(|e| i128::from(e.amount_minor)).sum::<i128>(),
            0
        );
    }

    #[test]
    fn capture_skips_zero_net_orders_and_revenue() {
        let checkout = checkout(40_000);
        let orders = vec![order(checkout.id, 40_000), order(checkout.id, 0)];

        let posting = capture_posting(&checkout, &orders).unwrap();

        // Clearing and one pending entry; no revenue line when the cut is zero.
        assert_eq!(posting.entries().len(), 2);
    }

    #[test]
    fn capture_replays_under_a_stable_key() {
        let checkout = checkout(10_000);
        let orders = vec![order(checkout.id, 9_000)];

        let a = capture_posting(&checkout, &orders).unwrap();
        let b = capture_posting(&checkout, &orders).unwrap();
        assert_eq!(a.idempotency_key, b.idempotency_key);
    }
}
