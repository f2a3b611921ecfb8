//! Ledger read routes.
//!
//! Balances are derived sums over the entry log; transactions are looked
//! up by the business reference that caused them, which is how a support
//! tool answers "where did the money for this checkout go".

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use uuid::Uuid;

use telar_core::ledger::{AccountKey, AccountOwner, LedgerAccountType};
use telar_db::repositories::{AccountRepository, PostingRepository, TransactionWithEntries};
use telar_shared::types::Currency;

use crate::AppState;
use crate::error::ApiError;

/// Creates ledger routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ledger/balance", get(account_balance))
        .route(
            "/ledger/transactions/{reference_type}/{reference_id}",
            get(transaction_by_reference),
        )
}

#[derive(Deserialize)]
struct BalanceQuery {
    owner_type: String,
    owner_id: Option<Uuid>,
    currency: Currency,
    account_type: LedgerAccountType,
}

/// GET /ledger/balance - Derived balance for one account key.
///
/// `?owner_type=shop&owner_id=..&currency=COP&account_type=available`
async fn account_balance(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = AccountOwner::from_parts(&query.owner_type, query.owner_id)?;
    let key = AccountKey {
        owner,
        currency: query.currency,
        account_type: query.account_type,
    };

    let repo = AccountRepository::new((*state.db).clone());
    let balance = repo.balance(&key).await?;
    Ok(Json(balance))
}

/// GET /ledger/transactions/{reference_type}/{reference_id} - Posting audit.
async fn transaction_by_reference(
    State(state): State<AppState>,
    Path((reference_type, reference_id)): Path<(String, Uuid)>,
) -> Result<Json<TransactionWithEntries>, ApiError> {
    let repo = PostingRepository::new((*state.db).clone());
    let transaction = repo
        .get_by_reference(&reference_type, reference_id)
        .await?;
    Ok(Json(transaction))
}
