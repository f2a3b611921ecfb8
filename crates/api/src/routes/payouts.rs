//! Payout routes.
//!
//! Requesting a payout checks the shop's available balance and locks the
//! funds into `payout_in_transit` atomically; confirm and fail settle the
//! reservation one way or the other.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use telar_core::payout::PayoutRequest;
use telar_db::repositories::PayoutRepository;
use telar_shared::types::{Currency, PageRequest, PayoutId, ShopId};

use crate::AppState;
use crate::error::ApiError;

/// Creates payout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payouts", post(request_payout))
        .route("/payouts/{payout_id}", get(get_payout))
        .route("/payouts/{payout_id}/confirm", post(confirm_payout))
        .route("/payouts/{payout_id}/fail", post(fail_payout))
        .route("/shops/{shop_id}/payouts", get(list_shop_payouts))
}

#[derive(Deserialize)]
struct RequestPayoutBody {
    shop_id: Uuid,
    currency: Currency,
    amount_minor: i64,
    destination: serde_json::Value,
    idempotency_key: String,
}

#[derive(Deserialize, Default)]
struct ConfirmPayoutBody {
    external_payout_id: Option<String>,
}

/// POST /payouts - Withdraw from a shop's available balance.
async fn request_payout(
    State(state): State<AppState>,
    Json(payload): Json<RequestPayoutBody>,
) -> Result<impl IntoResponse, ApiError> {
    let request = PayoutRequest::new(
        ShopId::from_uuid(payload.shop_id),
        payload.currency,
        payload.amount_minor,
        payload.destination,
        payload.idempotency_key,
    )?;

    let repo = PayoutRepository::new((*state.db).clone());
    let payout = repo.request(request).await?;

    info!(
        payout_id = %payout.id,
        shop_id = %payload.shop_id,
        amount_minor = payout.amount_minor,
        "Payout requested"
    );
    Ok((StatusCode::CREATED, Json(payout)))
}

/// GET /payouts/{payout_id} - Fetch a payout.
async fn get_payout(
    State(state): State<AppState>,
    Path(payout_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PayoutRepository::new((*state.db).clone());
    let payout = repo.get(PayoutId::from_uuid(payout_id)).await?;
    Ok(Json(payout))
}

/// GET /shops/{shop_id}/payouts?page=1&per_page=20 - List a shop's payouts.
async fn list_shop_payouts(
    State(state): State<AppState>,
    Path(shop_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PayoutRepository::new((*state.db).clone());
    let payouts = repo.list_for_shop(ShopId::from_uuid(shop_id), &page).await?;
    Ok(Json(payouts))
}

/// POST /payouts/{payout_id}/confirm - Provider paid the shop.
async fn confirm_payout(
    State(state): State<AppState>,
    Path(payout_id): Path<Uuid>,
    payload: Option<Json<ConfirmPayoutBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let repo = PayoutRepository::new((*state.db).clone());
    let payout = repo
        .confirm(PayoutId::from_uuid(payout_id), payload.external_payout_id)
        .await?;

    info!(payout_id = %payout.id, "Payout confirmed");
    Ok(Json(payout))
}

/// POST /payouts/{payout_id}/fail - Provider rejected; funds return.
async fn fail_payout(
    State(state): State<AppState>,
    Path(payout_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PayoutRepository::new((*state.db).clone());
    let payout = repo.fail(PayoutId::from_uuid(payout_id)).await?;

    info!(payout_id = %payout.id, "Payout failed, funds returned");
    Ok(Json(payout))
}
