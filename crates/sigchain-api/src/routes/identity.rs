//! # Identity Routes
//!
//! Proxy to the biometric face-match collaborator:
//!
//! - `POST /v1/identity/face-verify` — compare a reference asset
//!   against a candidate capture.
//!
//! The judgment is consumed as a black box. When the collaborator is
//! not configured the endpoint answers 503 rather than pretending to
//! verify.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sigchain_service::FaceMatchResult;

use crate::auth::CallerIdentity;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Request body for a face-verify call.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FaceVerifyRequest {
    /// Opaque reference to the stored photo of record.
    pub reference_ref: String,
    /// Opaque reference to the freshly captured photo.
    pub candidate_ref: String,
}

/// Response body for a face-verify call.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FaceVerifyResponse {
    /// Whether the two references depict the same person.
    pub is_match: bool,
    /// Collaborator-reported confidence in `[0, 1]`.
    pub confidence: f64,
}

impl From<FaceMatchResult> for FaceVerifyResponse {
    fn from(result: FaceMatchResult) -> Self {
        Self {
            is_match: result.is_match,
            confidence: result.confidence,
        }
    }
}

/// Build the identity router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/identity/face-verify", post(face_verify))
}

/// POST /v1/identity/face-verify — Compare two photo references.
#[utoipa::path(
    post,
    path = "/v1/identity/face-verify",
    request_body = FaceVerifyRequest,
    responses(
        (status = 200, description = "Same-person judgment", body = FaceVerifyResponse),
        (status = 503, description = "Face-match collaborator not configured", body = ErrorBody),
    ),
    tag = "identity",
)]
pub async fn face_verify(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Json(body): Json<FaceVerifyRequest>,
) -> Result<Json<FaceVerifyResponse>, AppError> {
    let client = state.facematch.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("face-match collaborator not configured".to_string())
    })?;

    let result = client
        .compare(&body.reference_ref, &body.candidate_ref)
        .await?;
    Ok(Json(result.into()))
}
