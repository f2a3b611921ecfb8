//! Checkout routes.
//!
//! Creating a checkout freezes the cart into a priced snapshot. The
//! client supplies an idempotency key; retrying with the same key returns
//! the snapshot built the first time.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use telar_db::repositories::{CheckoutRepository, CheckoutWithOrders, CreateCheckout};
use telar_shared::types::{CartId, CheckoutId};

use crate::AppState;
use crate::error::ApiError;

/// Creates checkout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/checkouts", post(create_checkout))
        .route("/checkouts/{checkout_id}", get(get_checkout))
}

#[derive(Deserialize)]
struct CreateCheckoutRequest {
    cart_id: Uuid,
    idempotency_key: String,
}

/// POST /checkouts - Freeze a cart into a checkout with orders and charges.
async fn create_checkout(
    State(state): State<AppState>,
    Json(payload): Json<CreateCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.idempotency_key.trim().is_empty() {
        return Err(ApiError::bad_request("idempotency_key must not be empty"));
    }

    let repo = CheckoutRepository::new((*state.db).clone());
    let checkout = repo
        .create_from_cart(CreateCheckout {
            cart_id: CartId::from_uuid(payload.cart_id),
            idempotency_key: payload.idempotency_key,
        })
        .await?;

    info!(
        checkout_id = %checkout.checkout.id,
        cart_id = %payload.cart_id,
        total_minor = checkout.checkout.total_minor,
        orders = checkout.orders.len(),
        "Checkout created"
    );
    Ok((StatusCode::CREATED, Json(checkout)))
}

/// GET /checkouts/{checkout_id} - Fetch a checkout with orders and charges.
async fn get_checkout(
    State(state): State<AppState>,
    Path(checkout_id): Path<Uuid>,
) -> Result<Json<CheckoutWithOrders>, ApiError> {
    let repo = CheckoutRepository::new((*state.db).clone());
    let checkout = repo.get(CheckoutId::from_uuid(checkout_id)).await?;
    Ok(Json(checkout))
}
