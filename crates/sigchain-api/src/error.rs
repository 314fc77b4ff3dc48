//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors to HTTP status codes and JSON error bodies.
//! Infrastructure failures keep distinguishable kinds all the way to
//! the API boundary; verification verdicts never pass through here —
//! they are routine 200 responses. Internal error details are never
//! exposed to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use sigchain_core::ValidationError;
use sigchain_service::{FaceMatchError, IssuanceError, VerificationError};
use sigchain_store::StoreError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "LEDGER_UNAVAILABLE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure — missing or invalid token (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The ledger could not be reached or refused the operation (502).
    /// Issuance aborts and verification cannot produce a verdict.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),

    /// A configured-off collaborator was required (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error (500). Message is logged but not returned
    /// to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status code and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::LedgerUnavailable(_) => (StatusCode::BAD_GATEWAY, "LEDGER_UNAVAILABLE"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<IssuanceError> for AppError {
    fn from(err: IssuanceError) -> Self {
        match err {
            IssuanceError::Validation(e) => Self::Validation(e.to_string()),
            IssuanceError::Anchor(e) => Self::LedgerUnavailable(e.to_string()),
            IssuanceError::Store(e) | IssuanceError::Persist(e) => Self::Internal(e.to_string()),
            IssuanceError::Task(e) => Self::Internal(e),
        }
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Ledger(e) => Self::LedgerUnavailable(e.to_string()),
        }
    }
}

impl From<FaceMatchError> for AppError {
    fn from(err: FaceMatchError) -> Self {
        match &err {
            FaceMatchError::Http { .. } => Self::ServiceUnavailable(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_status_code() {
        let (status, code) = AppError::NotFound("missing".into()).status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn validation_status_code() {
        let (status, code) = AppError::Validation("bad field".into()).status_and_code();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn ledger_unavailable_status_code() {
        let (status, code) = AppError::LedgerUnavailable("node down".into()).status_and_code();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(code, "LEDGER_UNAVAILABLE");
    }

    #[test]
    fn service_unavailable_status_code() {
        let (status, code) =
            AppError::ServiceUnavailable("not configured".into()).status_and_code();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(code, "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn validation_error_converts() {
        let app_err = AppError::from(ValidationError::MissingField("particulars"));
        assert!(matches!(app_err, AppError::Validation(_)));
    }

    #[test]
    fn issuance_anchor_error_maps_to_bad_gateway() {
        let ledger_err = sigchain_ledger::LedgerWriteError::Rejected {
            identifier: "0001".to_string(),
            reason: "out of gas".to_string(),
        };
        let app_err = AppError::from(IssuanceError::Anchor(ledger_err));
        let (status, _) = app_err.status_and_code();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    /// Extract status and body from a response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_not_found() {
        let (status, body) = response_parts(AppError::NotFound("certificate 0009".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error.code, "NOT_FOUND");
        assert!(body.error.message.contains("certificate 0009"));
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) =
            response_parts(AppError::Internal("db connection failed".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "INTERNAL_ERROR");
        assert!(
            !body.error.message.contains("db connection"),
            "internal error details must not leak: {}",
            body.error.message
        );
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn into_response_ledger_unavailable_keeps_reason() {
        let (status, body) =
            response_parts(AppError::LedgerUnavailable("anchor rejected".into())).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.error.message.contains("anchor rejected"));
    }
}
