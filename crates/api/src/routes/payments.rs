//! Payment routes: intents, attempts and provider outcome transitions.
//!
//! The success and failure hooks are what a provider webhook handler
//! would call; both are replay-safe so a retried webhook is harmless.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use telar_core::payment::PaymentAttemptStatus;
use telar_db::repositories::{CreateIntent, IntentWithAttempts, PaymentRepository, RecordAttempt};
use telar_shared::types::{CheckoutId, PaymentAttemptId, PaymentIntentId};

use crate::AppState;
use crate::error::ApiError;

/// Creates payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payment-intents", post(create_intent))
        .route("/payment-intents/{intent_id}", get(get_intent))
        .route("/payment-intents/{intent_id}/attempts", post(record_attempt))
        .route("/payment-intents/{intent_id}/succeed", post(succeed_intent))
        .route("/payment-intents/{intent_id}/fail", post(fail_intent))
        .route("/payment-attempts/{attempt_id}", patch(update_attempt))
}

#[derive(Deserialize)]
struct CreateIntentRequest {
    checkout_id: Uuid,
    provider_code: String,
}

#[derive(Deserialize)]
struct RecordAttemptRequest {
    idempotency_key: String,
    request_payload: serde_json::Value,
}

#[derive(Deserialize)]
struct UpdateAttemptRequest {
    status: PaymentAttemptStatus,
    response_payload: Option<serde_json::Value>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct SucceedIntentRequest {
    attempt_id: Uuid,
    external_intent_id: Option<String>,
}

#[derive(Deserialize, Default)]
struct FailIntentRequest {
    error_message: Option<String>,
}

/// POST /payment-intents - Open an intent for a checkout's full amount.
async fn create_intent(
    State(state): State<AppState>,
    Json(payload): Json<CreateIntentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());
    let intent = repo
        .create_intent(CreateIntent {
            checkout_id: CheckoutId::from_uuid(payload.checkout_id),
            provider_code: payload.provider_code,
        })
        .await?;

    info!(
        intent_id = %intent.id,
        checkout_id = %payload.checkout_id,
        amount_minor = intent.amount_minor,
        "Payment intent created"
    );
    Ok((StatusCode::CREATED, Json(intent)))
}

/// GET /payment-intents/{intent_id} - Fetch an intent with its attempts.
async fn get_intent(
    State(state): State<AppState>,
    Path(intent_id): Path<Uuid>,
) -> Result<Json<IntentWithAttempts>, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());
    let intent = repo
        .get_intent(PaymentIntentId::from_uuid(intent_id))
        .await?;
    Ok(Json(intent))
}

/// POST /payment-intents/{intent_id}/attempts - Record a provider attempt.
async fn record_attempt(
    State(state): State<AppState>,
    Path(intent_id): Path<Uuid>,
    Json(payload): Json<RecordAttemptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.idempotency_key.trim().is_empty() {
        return Err(ApiError::bad_request("idempotency_key must not be empty"));
    }

    let repo = PaymentRepository::new((*state.db).clone());
    let attempt = repo
        .record_attempt(RecordAttempt {
            intent_id: PaymentIntentId::from_uuid(intent_id),
            idempotency_key: payload.idempotency_key,
            request_payload: payload.request_payload,
        })
        .await?;

    info!(
        intent_id = %intent_id,
        attempt_id = %attempt.id,
        attempt_no = attempt.attempt_no,
        "Payment attempt recorded"
    );
    Ok((StatusCode::CREATED, Json(attempt)))
}

/// PATCH /payment-attempts/{attempt_id} - Advance an attempt's status.
async fn update_attempt(
    State(state): State<AppState>,
    Path(attempt_id): Path<Uuid>,
    Json(payload): Json<UpdateAttemptRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());
    let attempt = repo
        .update_attempt_status(
            PaymentAttemptId::from_uuid(attempt_id),
            payload.status,
            payload.response_payload,
            payload.error_message,
        )
        .await?;
    Ok(Json(attempt))
}

/// POST /payment-intents/{intent_id}/succeed - Provider confirmed capture.
///
/// Wraps the whole money moment: capture posting, checkout paid, cart
/// converted. Safe to call again for the same intent.
async fn succeed_intent(
    State(state): State<AppState>,
    Path(intent_id): Path<Uuid>,
    Json(payload): Json<SucceedIntentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = PaymentRepository::new((*state.db).clone());
    let intent = repo
        .mark_intent_succeeded(
            PaymentIntentId::from_uuid(intent_id),
            PaymentAttemptId::from_uuid(payload.attempt_id),
            payload.external_intent_id,
        )
        .await?;

    info!(intent_id = %intent.id, "Payment intent succeeded");
    Ok(Json(intent))
}

/// POST /payment-intents/{intent_id}/fail - Provider reported failure.
async fn fail_intent(
    State(state): State<AppState>,
    Path(intent_id): Path<Uuid>,
    payload: Option<Json<FailIntentRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let repo = PaymentRepository::new((*state.db).clone());
    let intent = repo
        .mark_intent_failed(PaymentIntentId::from_uuid(intent_id), payload.error_message)
        .await?;

    info!(intent_id = %intent.id, "Payment intent failed");
    Ok(Json(intent))
}
