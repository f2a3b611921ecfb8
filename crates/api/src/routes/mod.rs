//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod carts;
pub mod charge_rules;
pub mod checkouts;
pub mod health;
pub mod ledger;
pub mod orders;
pub mod payments;
pub mod payouts;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(carts::routes())
        .merge(charge_rules::routes())
        .merge(checkouts::routes())
        .merge(payments::routes())
        .merge(payouts::routes())
        .merge(orders::routes())
        .merge(ledger::routes())
}
