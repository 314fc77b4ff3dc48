//! # OpenAPI Specification Assembly
//!
//! Assembles the documented routes into a single OpenAPI spec served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sigchain API — Tamper-Evident Certificates",
        version = "0.1.0",
        description = "Certificate issuance and verification: content fields are fingerprinted, anchored on an append-only ledger, and verified with a three-way consistency check.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        crate::routes::certificates::issue_certificate,
        crate::routes::certificates::list_certificates,
        crate::routes::certificates::get_certificate,
        crate::routes::certificates::delete_certificate,
        crate::routes::certificates::verify_certificate,
        crate::routes::identity::face_verify,
    ),
    components(schemas(
        crate::routes::certificates::IssueCertificateRequest,
        crate::routes::certificates::IssueCertificateResponse,
        crate::routes::certificates::DeleteCertificateResponse,
        crate::routes::identity::FaceVerifyRequest,
        crate::routes::identity::FaceVerifyResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "certificates", description = "Certificate issuance, records, and verification"),
        (name = "identity", description = "Face-match collaborator proxy"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json — Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_contains_all_certificate_paths() {
        let spec = serde_json::to_value(ApiDoc::openapi()).unwrap();
        let paths = spec["paths"].as_object().unwrap();
        assert!(paths.contains_key("/v1/certificates"));
        assert!(paths.contains_key("/v1/certificates/{id}"));
        assert!(paths.contains_key("/v1/certificates/{id}/verify"));
        assert!(paths.contains_key("/v1/identity/face-verify"));
    }
}
