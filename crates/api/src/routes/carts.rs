//! Cart routes.
//!
//! Item mutations carry the version the client last read; a stale version
//! comes back as 409 `CART_VERSION_CONFLICT` and the client reloads.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use telar_core::cart::AbandonOutcome;
use telar_core::context::SaleContext;
use telar_core::pricing::PriceKey;
use telar_db::repositories::{CartRepository, CartWithItems, NewCart, NewCartItem, PriceRepository};
use telar_db::entities::{carts, sea_orm_active_enums};
use telar_shared::types::{CartId, CartItemId, Currency, ShopId, UserId};

use crate::AppState;
use crate::error::ApiError;

/// Creates cart routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/carts", post(create_cart))
        .route("/carts/{cart_id}", get(get_cart))
        .route("/carts/{cart_id}/items", post(add_item))
        .route("/carts/{cart_id}/items/{item_id}", patch(update_item))
        .route("/carts/{cart_id}/items/{item_id}", delete(remove_item))
        .route("/carts/{cart_id}/abandon", post(abandon_cart))
}

#[derive(Deserialize)]
struct CreateCartRequest {
    buyer_user_id: Uuid,
    #[serde(flatten)]
    context: SaleContext,
    currency: Currency,
}

#[derive(Deserialize)]
struct AddItemRequest {
    product_id: Uuid,
    seller_shop_id: Uuid,
    quantity: i32,
    expected_version: i32,
}

#[derive(Deserialize)]
struct UpdateItemRequest {
    quantity: i32,
    expected_version: i32,
}

#[derive(Deserialize)]
struct VersionQuery {
    expected_version: i32,
}

/// POST /carts - Open a cart for a buyer in a sale context.
async fn create_cart(
    State(state): State<AppState>,
    Json(payload): Json<CreateCartRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CartRepository::new((*state.db).clone());

    let cart = repo
        .create(NewCart {
            buyer_user_id: UserId::from_uuid(payload.buyer_user_id),
            context: payload.context,
            currency: payload.currency,
        })
        .await?;

    info!(cart_id = %cart.id, buyer = %cart.buyer_user_id, "Cart created");
    Ok((StatusCode::CREATED, Json(cart)))
}

/// GET /carts/{cart_id} - Fetch a cart with its items.
async fn get_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> Result<Json<CartWithItems>, ApiError> {
    let repo = CartRepository::new((*state.db).clone());
    let cart = repo.get(CartId::from_uuid(cart_id)).await?;
    Ok(Json(cart))
}

/// POST /carts/{cart_id}/items - Add a product at its currently resolved price.
async fn add_item(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let cart_repo = CartRepository::new((*state.db).clone());
    let price_repo = PriceRepository::new((*state.db).clone());

    let cart_id = CartId::from_uuid(cart_id);
    let existing = cart_repo.get(cart_id).await?;
    let context = sale_context_of(&existing.cart)?;
    let currency = cart_currency_of(&existing.cart)?;

    // The server resolves the price; the client never supplies one.
    let price = price_repo
        .resolve(&PriceKey::new(payload.product_id, context, currency))
        .await?;

    let cart = cart_repo
        .add_item(
            cart_id,
            payload.expected_version,
            NewCartItem {
                product_id: payload.product_id,
                seller_shop_id: ShopId::from_uuid(payload.seller_shop_id),
                quantity: payload.quantity,
                unit_price_minor: price.amount_minor,
                currency,
                price_source: price.source.as_str().to_string(),
                price_ref_id: Some(price.id.into_inner()),
            },
        )
        .await?;

    info!(
        cart_id = %cart.cart.id,
        product_id = %payload.product_id,
        unit_price_minor = price.amount_minor,
        "Item added to cart"
    );
    Ok((StatusCode::CREATED, Json(cart)))
}

/// PATCH /carts/{cart_id}/items/{item_id} - Change an item's quantity.
async fn update_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<CartWithItems>, ApiError> {
    let repo = CartRepository::new((*state.db).clone());
    let cart = repo
        .update_item_quantity(
            CartId::from_uuid(cart_id),
            payload.expected_version,
            CartItemId::from_uuid(item_id),
            payload.quantity,
        )
        .await?;
    Ok(Json(cart))
}

/// DELETE /carts/{cart_id}/items/{item_id}?expected_version=N - Remove an item.
async fn remove_item(
    State(state): State<AppState>,
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    Query(query): Query<VersionQuery>,
) -> Result<Json<CartWithItems>, ApiError> {
    let repo = CartRepository::new((*state.db).clone());
    let cart = repo
        .remove_item(
            CartId::from_uuid(cart_id),
            query.expected_version,
            CartItemId::from_uuid(item_id),
        )
        .await?;
    Ok(Json(cart))
}

/// POST /carts/{cart_id}/abandon - Abandon an open cart (no-op if terminal).
async fn abandon_cart(
    State(state): State<AppState>,
    Path(cart_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = CartRepository::new((*state.db).clone());
    let outcome = repo.abandon(CartId::from_uuid(cart_id)).await?;

    let outcome = match outcome {
        AbandonOutcome::Abandoned => "abandoned",
        AbandonOutcome::NoOp => "noop",
    };
    info!(cart_id = %cart_id, outcome, "Cart abandon requested");
    Ok(Json(serde_json::json!({ "outcome": outcome })))
}

fn sale_context_of(cart: &carts::Model) -> Result<SaleContext, ApiError> {
    let context = match cart.context {
        sea_orm_active_enums::SaleContext::Marketplace => SaleContext::Marketplace,
        sea_orm_active_enums::SaleContext::Tenant => SaleContext::Tenant(ShopId::from_uuid(
            cart.context_shop_id.ok_or_else(|| {
                ApiError::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATA_INTEGRITY",
                    "tenant cart is missing its context shop",
                )
            })?,
        )),
    };
    Ok(context)
}

fn cart_currency_of(cart: &carts::Model) -> Result<Currency, ApiError> {
    cart.currency
        .parse()
        .map_err(|_| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "DATA_INTEGRITY", "cart carries an unknown currency"))
}
