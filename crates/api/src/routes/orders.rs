//! Order fulfillment routes.
//!
//! Delivery is the settlement trigger: marking an order delivered moves
//! the seller's net from pending to available in the same transaction.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
};
use tracing::info;
use uuid::Uuid;

use telar_db::repositories::SettlementRepository;
use telar_shared::types::OrderId;

use crate::AppState;
use crate::error::ApiError;

/// Creates order fulfillment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders/{order_id}/deliver", post(deliver_order))
        .route("/orders/{order_id}/cancel", post(cancel_order))
}

/// POST /orders/{order_id}/deliver - Mark delivered and release funds.
async fn deliver_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = SettlementRepository::new((*state.db).clone());
    let order = repo.mark_delivered(OrderId::from_uuid(order_id)).await?;

    info!(
        order_id = %order.id,
        net_to_seller_minor = order.net_to_seller_minor,
        "Order delivered, seller funds released"
    );
    Ok(Json(order))
}

/// POST /orders/{order_id}/cancel - Cancel an undelivered order.
async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = SettlementRepository::new((*state.db).clone());
    let order = repo.cancel(OrderId::from_uuid(order_id)).await?;

    info!(order_id = %order.id, "Order canceled");
    Ok(Json(order))
}
