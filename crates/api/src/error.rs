//! Maps domain errors onto HTTP responses.
//!
//! Every error leaves the API as a JSON envelope:
//! `{ "error": { "code": "...", "message": "..." } }`
//! with the status the domain error dictates.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use telar_core::cart::CartError;
use telar_core::checkout::CheckoutError;
use telar_core::ledger::LedgerError;
use telar_core::payment::PaymentError;
use telar_core::payout::PayoutError;
use telar_core::pricing::PricingError;
use telar_shared::AppError;

/// A fully resolved API error ready to be serialized.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Builds an error from explicit parts.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// A 400 for request-shape problems the domain never sees.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// The stable machine-readable error code.
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn from_parts(status: u16, code: &'static str, message: String) -> Self {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(code, %message, "request failed");
        }
        Self {
            status,
            code,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "code": self.code,
                "message": self.message,
            }
        }));
        (self.status, body).into_response()
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        Self::from_parts(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::from_parts(err.status_code(), err.error_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case::cart_not_found(ApiError::from(CartError::NotFound(Uuid::nil())), StatusCode::NOT_FOUND, "CART_NOT_FOUND")]
    #[case::version_conflict(
        ApiError::from(CartError::VersionConflict { expected: 1, actual: 2 }),
        StatusCode::CONFLICT,
        "CART_VERSION_CONFLICT"
    )]
    #[case::insufficient_balance(
        ApiError::from(PayoutError::from(LedgerError::InsufficientBalance {
            requested: 200,
            available: 100,
        })),
        StatusCode::UNPROCESSABLE_ENTITY,
        "INSUFFICIENT_BALANCE"
    )]
    fn maps_domain_errors(
        #[case] err: ApiError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        assert_eq!(err.status(), status);
        assert_eq!(err.code(), code);
    }

    #[test]
    fn envelope_shape() {
        let response = ApiError::bad_request("missing field").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
