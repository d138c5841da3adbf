//! # API Errors
//!
//! Every handler returns `ApiResult<T>`; failures render as
//! `{"error": "<message>", "code": "<CODE>"}`.
//!
//! ```text
//! ApiError          Status  code
//! ───────────────   ──────  ─────────────────
//! BadRequest        400     BAD_REQUEST
//! NotFound          404     NOT_FOUND
//! Conflict          409     CONFLICT
//! Internal          500     INTERNAL_ERROR     (message replaced)
//! PaymentGateway    502     PAYMENT_GATEWAY
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use rentline_booking::BookingError;
use rentline_core::ValidationError;
use rentline_db::DbError;

use crate::payment::PaymentError;

/// HTTP-facing errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Details are logged, never sent to the client.
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    PaymentGateway(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::PaymentGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::PaymentGateway(_) => "PAYMENT_GATEWAY",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let message = match self {
            ApiError::Internal(detail) => {
                error!(detail = %detail, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message, code })).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            DbError::UniqueViolation { .. } => ApiError::Conflict(err.to_string()),
            DbError::ConstraintViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Validation(v) => v.into(),
            BookingError::VehicleNotFound { .. }
            | BookingError::ReservationNotFound { .. }
            | BookingError::UnknownRate { .. } => ApiError::NotFound(err.to_string()),
            BookingError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            BookingError::Store(db) => db.into(),
            BookingError::ReconcilerStopped => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        warn!(?err, "Payment gateway call failed");
        ApiError::PaymentGateway("Failed to create payment intent".to_string())
    }
}
