//! # Certificate Routes
//!
//! The certificate lifecycle surface:
//!
//! - `POST   /v1/certificates` — issue (authenticated write path)
//! - `GET    /v1/certificates` — list the caller's certificates
//! - `GET    /v1/certificates/:id` — owner-scoped fetch
//! - `DELETE /v1/certificates/:id` — owner-scoped hard delete
//! - `GET    /v1/certificates/:id/verify` — public three-way verification
//!
//! Verification verdicts are always 200 responses — a certificate that
//! does not verify is routine output, not a fault. Only infrastructure
//! failures surface as error statuses.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use sigchain_core::{AssetRefs, CertificateId, CertificateRecord, IssuanceFields};
use sigchain_service::{IssuanceRequest, VerificationReport};

use crate::auth::CallerIdentity;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

/// Request body for certificate issuance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct IssueCertificateRequest {
    /// What is being certified.
    pub particulars: String,
    /// Free-text description.
    pub description: String,
    /// Name of the person signing.
    pub signatory_name: String,
    /// Expiry date (stored, not enforced).
    pub expiry_date: String,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
    /// Opaque asset references from the asset store collaborator.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub assets: AssetRefs,
}

/// Response body for certificate issuance.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueCertificateResponse {
    /// The allocated certificate identifier.
    pub identifier: String,
    /// Digest of the canonical content fields, lowercase hex.
    pub digest: String,
    /// The ledger transaction reference for the anchor.
    pub transaction_ref: String,
    /// The complete persisted record.
    #[schema(value_type = Object)]
    pub record: CertificateRecord,
}

/// Response body for certificate deletion.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteCertificateResponse {
    /// The deleted identifier.
    pub identifier: String,
    /// Always true on success; deletion of a missing or foreign
    /// certificate is a 404 instead.
    pub deleted: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the certificates router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/certificates",
            get(list_certificates).post(issue_certificate),
        )
        .route(
            "/v1/certificates/:id",
            get(get_certificate).delete(delete_certificate),
        )
        .route("/v1/certificates/:id/verify", get(verify_certificate))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /v1/certificates — Issue a certificate.
///
/// Runs the full write path: validate → allocate → hash → anchor →
/// persist. The issuance is detached from this request's lifetime so a
/// client disconnect cannot leave a half-anchored state.
#[utoipa::path(
    post,
    path = "/v1/certificates",
    request_body = IssueCertificateRequest,
    responses(
        (status = 201, description = "Certificate issued and anchored", body = IssueCertificateResponse),
        (status = 422, description = "Missing required content fields", body = ErrorBody),
        (status = 502, description = "Ledger anchoring failed; nothing persisted", body = ErrorBody),
    ),
    tag = "certificates",
)]
pub async fn issue_certificate(
    State(state): State<AppState>,
    caller: CallerIdentity,
    headers: HeaderMap,
    Json(body): Json<IssueCertificateRequest>,
) -> Result<(StatusCode, Json<IssueCertificateResponse>), AppError> {
    let request = IssuanceRequest {
        fields: IssuanceFields {
            particulars: body.particulars,
            description: body.description,
            signatory_name: body.signatory_name,
            expiry_date: body.expiry_date,
            location: body.location,
        },
        assets: body.assets,
        network_address: client_address(&headers),
    };

    let record = state
        .issuance
        .issue_detached(caller.issuer_email, request)
        .await?;

    let response = IssueCertificateResponse {
        identifier: record.identifier.to_string(),
        digest: record.digest.to_hex(),
        transaction_ref: record.transaction_ref.clone().unwrap_or_default(),
        record: present(record, &state.config.asset_base_url),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /v1/certificates — List the caller's certificates, newest first.
#[utoipa::path(
    get,
    path = "/v1/certificates",
    responses(
        (status = 200, description = "The caller's certificates, newest first"),
    ),
    tag = "certificates",
)]
pub async fn list_certificates(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<CertificateRecord>> {
    let records = state
        .store
        .list_by_issuer(&caller.issuer_email)
        .into_iter()
        .map(|record| present(record, &state.config.asset_base_url))
        .collect();
    Json(records)
}

/// GET /v1/certificates/:id — Owner-scoped fetch.
///
/// Asset references are mapped to public URLs under the configured
/// asset base URL.
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}",
    params(("id" = String, Path, description = "Certificate identifier")),
    responses(
        (status = 200, description = "The certificate record"),
        (status = 404, description = "Unknown or foreign certificate", body = ErrorBody),
    ),
    tag = "certificates",
)]
pub async fn get_certificate(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<CertificateRecord>, AppError> {
    let id = parse_identifier(&id)?;
    let record = state
        .store
        .get_owned(&id, &caller.issuer_email)
        .ok_or_else(|| AppError::NotFound(format!("certificate {id} not found")))?;
    Ok(Json(present(record, &state.config.asset_base_url)))
}

/// DELETE /v1/certificates/:id — Owner-scoped hard delete.
///
/// Removes the record and releases its asset references. The ledger
/// anchor is append-only and is never retracted.
#[utoipa::path(
    delete,
    path = "/v1/certificates/{id}",
    params(("id" = String, Path, description = "Certificate identifier")),
    responses(
        (status = 200, description = "Certificate deleted", body = DeleteCertificateResponse),
        (status = 404, description = "Unknown or foreign certificate", body = ErrorBody),
    ),
    tag = "certificates",
)]
pub async fn delete_certificate(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<String>,
) -> Result<Json<DeleteCertificateResponse>, AppError> {
    let id = parse_identifier(&id)?;
    let deleted = state.store.delete(&id, &caller.issuer_email).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("certificate {id} not found")));
    }
    Ok(Json(DeleteCertificateResponse {
        identifier: id.to_string(),
        deleted: true,
    }))
}

/// GET /v1/certificates/:id/verify — Public three-way verification.
///
/// All four verdicts are 200 responses. A 502 means the ledger could
/// not be read — which is a service failure, never "not anchored".
#[utoipa::path(
    get,
    path = "/v1/certificates/{id}/verify",
    params(("id" = String, Path, description = "Certificate identifier")),
    responses(
        (status = 200, description = "Verification report with verdict"),
        (status = 502, description = "Ledger read failed", body = ErrorBody),
    ),
    tag = "certificates",
)]
pub async fn verify_certificate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<VerificationReport>, AppError> {
    let id = parse_identifier(&id)?;
    let report = state.verification.verify(&id).await?;
    Ok(Json(report))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a path identifier, mapping failures to 400.
fn parse_identifier(raw: &str) -> Result<CertificateId, AppError> {
    CertificateId::parse(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Raw client address from proxy headers, for forensic metadata.
/// Normalization happens in the issuance coordinator.
fn client_address(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("unknown")
        .trim()
        .to_string()
}

/// Map stored asset references to public URLs for presentation.
///
/// Stored references may be server-local paths; clients receive URLs
/// under `{asset_base_url}/{identifier}/{basename}`.
fn present(mut record: CertificateRecord, asset_base_url: &str) -> CertificateRecord {
    let id = record.identifier.as_str().to_string();
    let map = |asset: &mut Option<String>| {
        if let Some(stored) = asset.take() {
            let basename = stored.rsplit('/').next().unwrap_or(&stored).to_string();
            *asset = Some(format!("{asset_base_url}/{id}/{basename}"));
        }
    };
    map(&mut record.assets.document_photo);
    map(&mut record.assets.signature_photo);
    map(&mut record.assets.signatory_photo);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigchain_core::{sha256_digest, CanonicalFields};

    fn record_with_assets() -> CertificateRecord {
        let identifier = CertificateId::from_number(7);
        let canonical = CanonicalFields::new(
            identifier.as_str(),
            "issuer@example.com",
            "Deed",
            "desc",
            "J. Doe",
            "2030-01-01",
        );
        CertificateRecord {
            identifier,
            issuer_email: "issuer@example.com".to_string(),
            particulars: "Deed".to_string(),
            description: "desc".to_string(),
            signatory_name: "J. Doe".to_string(),
            expiry_date: "2030-01-01".to_string(),
            location: None,
            creation_date: "2026-08-07".to_string(),
            creation_time: "10:00:00".to_string(),
            network_address: "127.0.0.1".to_string(),
            assets: AssetRefs {
                document_photo: Some("certificate_images/0007/docphoto_0007.jpg".to_string()),
                signature_photo: None,
                signatory_photo: Some("signatoryphoto_0007.jpg".to_string()),
            },
            digest: sha256_digest(&canonical.canonical_bytes()),
            transaction_ref: Some("0xabc".to_string()),
        }
    }

    #[test]
    fn present_maps_asset_paths_to_public_urls() {
        let presented = present(record_with_assets(), "http://localhost:8080/assets");
        assert_eq!(
            presented.assets.document_photo.as_deref(),
            Some("http://localhost:8080/assets/0007/docphoto_0007.jpg")
        );
        assert_eq!(
            presented.assets.signatory_photo.as_deref(),
            Some("http://localhost:8080/assets/0007/signatoryphoto_0007.jpg")
        );
        assert!(presented.assets.signature_photo.is_none());
    }

    #[test]
    fn present_leaves_content_fields_untouched() {
        let record = record_with_assets();
        let digest_before = record.digest;
        let presented = present(record, "http://assets.example.com");
        assert_eq!(presented.digest, digest_before);
        assert_eq!(presented.particulars, "Deed");
    }

    #[test]
    fn client_address_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", "10.1.2.3, 10.0.0.1".parse().unwrap());
        headers.insert("x-real-ip", "10.9.9.9".parse().unwrap());
        assert_eq!(client_address(&headers), "10.1.2.3");
    }

    #[test]
    fn client_address_falls_back_to_real_ip_then_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "10.9.9.9".parse().unwrap());
        assert_eq!(client_address(&headers), "10.9.9.9");
        assert_eq!(client_address(&HeaderMap::new()), "unknown");
    }

    #[test]
    fn parse_identifier_maps_to_bad_request() {
        assert!(parse_identifier("0001").is_ok());
        assert!(matches!(
            parse_identifier("not-a-number"),
            Err(AppError::BadRequest(_))
        ));
    }
}
