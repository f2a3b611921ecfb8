//! Charge rule administration routes.
//!
//! Rules are append-and-deactivate: a deactivated rule stays in history
//! and simply stops matching; pricing already frozen onto checkouts is
//! untouched.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use telar_core::charges::{ChargeDirection, ChargeRule, ChargeScope, SaleContextMatch};
use telar_core::context::SaleContext;
use telar_db::repositories::{ChargeRuleRepository, NewChargeRule};
use telar_shared::types::{ChargeRuleId, ChargeTypeId, Currency, MinorAmount};

use crate::AppState;
use crate::error::ApiError;

/// Creates charge rule admin routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/charge-rules", get(list_active_rules))
        .route("/charge-rules", post(create_rule))
        .route("/charge-rules/{rule_id}", delete(deactivate_rule))
}

#[derive(Deserialize)]
struct ActiveRulesQuery {
    context: String,
    context_shop_id: Option<Uuid>,
}

#[derive(Deserialize)]
struct CreateRuleRequest {
    code: String,
    direction: ChargeDirection,
    scope: ChargeScope,
    context: String,
    context_shop_id: Option<Uuid>,
    currency: Option<Currency>,
    rate_bps: Option<i32>,
    fixed_minor: Option<MinorAmount>,
    priority: i32,
    effective_from: Option<DateTime<Utc>>,
    effective_to: Option<DateTime<Utc>>,
}

/// GET /charge-rules?context=marketplace - Active rules for a context.
async fn list_active_rules(
    State(state): State<AppState>,
    Query(query): Query<ActiveRulesQuery>,
) -> Result<Json<Vec<ChargeRule>>, ApiError> {
    let context = SaleContext::from_parts(&query.context, query.context_shop_id)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let repo = ChargeRuleRepository::new((*state.db).clone());
    let rules = repo.load_active(context).await?;
    Ok(Json(rules))
}

/// POST /charge-rules - Create a rule, creating its charge type if new.
async fn create_rule(
    State(state): State<AppState>,
    Json(payload): Json<CreateRuleRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let context = match (payload.context.as_str(), payload.context_shop_id) {
        ("marketplace", None) => SaleContextMatch::Marketplace,
        ("marketplace", Some(_)) => {
            return Err(ApiError::bad_request(
                "marketplace rules must not carry a context_shop_id",
            ));
        }
        ("tenant", shop) => SaleContextMatch::Tenant(shop),
        (other, _) => {
            return Err(ApiError::bad_request(format!("unknown context: {other}")));
        }
    };
    if payload.rate_bps.is_none() && payload.fixed_minor.is_none() {
        return Err(ApiError::bad_request(
            "a rule needs rate_bps, fixed_minor, or both",
        ));
    }

    let repo = ChargeRuleRepository::new((*state.db).clone());
    let charge_type = repo
        .ensure_type(&payload.code, payload.direction, payload.scope)
        .await?;
    let rule = repo
        .create_rule(NewChargeRule {
            charge_type_id: ChargeTypeId::from_uuid(charge_type.id),
            context,
            currency: payload.currency,
            rate_bps: payload.rate_bps,
            fixed_minor: payload.fixed_minor,
            priority: payload.priority,
            effective_from: payload.effective_from.unwrap_or_else(Utc::now),
            effective_to: payload.effective_to,
        })
        .await?;

    info!(rule_id = %rule.id, code = %payload.code, "Charge rule created");
    Ok((StatusCode::CREATED, Json(rule)))
}

/// DELETE /charge-rules/{rule_id} - Deactivate a rule in place.
async fn deactivate_rule(
    State(state): State<AppState>,
    Path(rule_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ChargeRuleRepository::new((*state.db).clone());
    repo.deactivate_rule(ChargeRuleId::from_uuid(rule_id))
        .await?;

    info!(rule_id = %rule_id, "Charge rule deactivated");
    Ok(StatusCode::NO_CONTENT)
}
