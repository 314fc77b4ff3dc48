//! # API Contract Tests
//!
//! Drives the assembled router end to end via `tower::ServiceExt` —
//! issuance, verification verdicts, ownership scoping, deletion,
//! authentication, and the error surfaces (400/401/404/422/502/503).

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use sigchain_api::state::{AppConfig, AppState};
use sigchain_ledger::{AnchorLedger, MemoryLedger};
use sigchain_store::CertificateStore;

/// Build a test app with auth disabled and an in-memory ledger.
fn test_app() -> axum::Router {
    sigchain_api::app(AppState::new())
}

/// Build a test app with auth enabled.
fn authed_app(token: &str) -> axum::Router {
    let config = AppConfig {
        auth_token: Some(token.to_string()),
        ..AppConfig::default()
    };
    let state = AppState::with_parts(
        config,
        CertificateStore::in_memory(),
        AnchorLedger::Memory(MemoryLedger::new()),
        None,
    );
    sigchain_api::app(state)
}

/// Build a test app whose ledger and store handles are also returned,
/// for failure injection and divergence seeding.
fn instrumented_app() -> (axum::Router, CertificateStore, MemoryLedger) {
    let store = CertificateStore::in_memory();
    let ledger = MemoryLedger::new();
    let state = AppState::with_parts(
        AppConfig::default(),
        store.clone(),
        AnchorLedger::Memory(ledger.clone()),
        None,
    );
    (sigchain_api::app(state), store, ledger)
}

/// Read a response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// POST helper with JSON body.
fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// POST helper with JSON body and bearer token.
fn post_json_auth(uri: &str, body: serde_json::Value, bearer: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {bearer}"))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// GET helper.
fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// GET helper with bearer token.
fn get_auth(uri: &str, bearer: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {bearer}"))
        .body(Body::empty())
        .unwrap()
}

/// DELETE helper.
fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// A complete issuance body.
fn issuance_body() -> serde_json::Value {
    json!({
        "particulars": "Deed A",
        "description": "desc",
        "signatory_name": "J. Doe",
        "expiry_date": "2030-01-01",
    })
}

/// Issue a certificate and return the response JSON.
async fn issue(app: &axum::Router) -> serde_json::Value {
    let resp = app
        .clone()
        .oneshot(post_json("/v1/certificates", issuance_body()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// ---------------------------------------------------------------------------
// Health and docs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_probes_are_unauthenticated() {
    let app = authed_app("secret");
    for uri in ["/health/liveness", "/health/readiness"] {
        let resp = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let resp = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let spec = body_json(resp).await;
    assert!(spec["paths"]["/v1/certificates"].is_object());
}

// ---------------------------------------------------------------------------
// Issuance
// ---------------------------------------------------------------------------

#[tokio::test]
async fn first_issuance_returns_the_documented_example_shape() {
    let app = test_app();
    let body = issue(&app).await;

    assert_eq!(body["identifier"], "0001");
    let digest = body["digest"].as_str().unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(!body["transaction_ref"].as_str().unwrap().is_empty());
    assert_eq!(body["record"]["issuer_email"], "dev@sigchain.local");
}

#[tokio::test]
async fn identifiers_increase_across_issuances() {
    let app = test_app();
    assert_eq!(issue(&app).await["identifier"], "0001");
    assert_eq!(issue(&app).await["identifier"], "0002");
    assert_eq!(issue(&app).await["identifier"], "0003");
}

#[tokio::test]
async fn issuance_with_missing_field_is_422() {
    let app = test_app();
    let mut body = issuance_body();
    body["particulars"] = json!("");
    let resp = app
        .oneshot(post_json("/v1/certificates", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn issuance_with_malformed_json_is_a_client_error() {
    let app = test_app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/certificates")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn ledger_write_failure_is_502_with_no_record() {
    let (app, store, ledger) = instrumented_app();
    ledger.set_fail_writes(true);

    let resp = app
        .clone()
        .oneshot(post_json("/v1/certificates", issuance_body()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "LEDGER_UNAVAILABLE");

    assert!(store.is_empty(), "no record may persist after an anchor failure");

    // Listing confirms the store is empty through the API too.
    let resp = app.oneshot(get("/v1/certificates")).await.unwrap();
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn issue_then_verify_is_verified() {
    let app = test_app();
    let issued = issue(&app).await;

    let resp = app
        .oneshot(get("/v1/certificates/0001/verify"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let report = body_json(resp).await;
    assert_eq!(report["verdict"], "VERIFIED");
    assert_eq!(report["stored_digest"], issued["digest"]);
    assert_eq!(report["ledger_digest"], issued["digest"]);
    assert_eq!(report["recomputed_digest"], issued["digest"]);
    assert_eq!(report["transaction_ref"], issued["transaction_ref"]);
    assert!(report["anchored_at"].is_string() || report["anchored_at"].is_object());
}

#[tokio::test]
async fn verify_of_unknown_identifier_is_certificate_unknown() {
    let app = test_app();
    let resp = app
        .oneshot(get("/v1/certificates/0099/verify"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let report = body_json(resp).await;
    assert_eq!(report["verdict"], "CERTIFICATE_UNKNOWN");
}

#[tokio::test]
async fn verify_with_invalid_identifier_is_400() {
    let app = test_app();
    let resp = app
        .oneshot(get("/v1/certificates/not-a-number/verify"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn forced_ledger_divergence_is_tampered_or_mismatched() {
    let (app, _store, ledger) = instrumented_app();
    issue(&app).await;

    ledger.seed_entry("0001", &"00".repeat(32));

    let resp = app
        .oneshot(get("/v1/certificates/0001/verify"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let report = body_json(resp).await;
    assert_eq!(report["verdict"], "TAMPERED_OR_MISMATCHED");
    assert_ne!(report["ledger_digest"], report["stored_digest"]);
}

// ---------------------------------------------------------------------------
// Records: list, get, delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_own_certificates_newest_first() {
    let app = test_app();
    issue(&app).await;
    issue(&app).await;

    let resp = app.oneshot(get("/v1/certificates")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let listed = body_json(resp).await;
    let ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["identifier"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["0002", "0001"]);
}

#[tokio::test]
async fn get_certificate_maps_asset_refs_to_urls() {
    let app = test_app();
    let mut body = issuance_body();
    body["assets"] = json!({"document_photo": "uploads/tmp/docphoto.jpg"});
    let resp = app
        .clone()
        .oneshot(post_json("/v1/certificates", body))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app.oneshot(get("/v1/certificates/0001")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let record = body_json(resp).await;
    let url = record["assets"]["document_photo"].as_str().unwrap();
    assert_eq!(url, "http://localhost:8080/assets/0001/docphoto.jpg");
}

#[tokio::test]
async fn get_of_unknown_certificate_is_404() {
    let app = test_app();
    let resp = app.oneshot(get("/v1/certificates/0042")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn delete_removes_the_record_but_not_the_anchor() {
    let (app, _store, ledger) = instrumented_app();
    issue(&app).await;

    let resp = app
        .clone()
        .oneshot(delete("/v1/certificates/0001"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["deleted"], true);

    // The record is gone…
    let resp = app
        .clone()
        .oneshot(get("/v1/certificates/0001"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // …verification now reports the certificate as unknown…
    let resp = app
        .oneshot(get("/v1/certificates/0001/verify"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["verdict"], "CERTIFICATE_UNKNOWN");

    // …but the ledger anchor is untouched.
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn delete_of_unknown_certificate_is_404() {
    let app = test_app();
    let resp = app.oneshot(delete("/v1/certificates/0001")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Authentication and ownership
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_401_when_auth_is_enabled() {
    let app = authed_app("s3cret");
    let resp = app
        .oneshot(post_json("/v1/certificates", issuance_body()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_secret_is_401() {
    let app = authed_app("s3cret");
    let resp = app
        .oneshot(post_json_auth(
            "/v1/certificates",
            issuance_body(),
            "a@example.com:wrong1",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_binds_the_issuer_identity() {
    let app = authed_app("s3cret");
    let resp = app
        .clone()
        .oneshot(post_json_auth(
            "/v1/certificates",
            issuance_body(),
            "alice@example.com:s3cret",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["record"]["issuer_email"], "alice@example.com");
}

#[tokio::test]
async fn records_are_scoped_to_their_owner() {
    let app = authed_app("s3cret");
    let resp = app
        .clone()
        .oneshot(post_json_auth(
            "/v1/certificates",
            issuance_body(),
            "alice@example.com:s3cret",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // Another issuer cannot fetch, list, or delete Alice's record.
    let resp = app
        .clone()
        .oneshot(get_auth("/v1/certificates/0001", "bob@example.com:s3cret"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = app
        .clone()
        .oneshot(get_auth("/v1/certificates", "bob@example.com:s3cret"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await.as_array().unwrap().len(), 0);

    // But anyone can verify it — verification is public.
    let resp = app
        .oneshot(get_auth(
            "/v1/certificates/0001/verify",
            "bob@example.com:s3cret",
        ))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["verdict"], "VERIFIED");
}

#[tokio::test]
async fn legacy_bare_secret_is_accepted() {
    let app = authed_app("s3cret");
    let resp = app
        .oneshot(post_json_auth("/v1/certificates", issuance_body(), "s3cret"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["record"]["issuer_email"], "operator@sigchain.local");
}

// ---------------------------------------------------------------------------
// Face-match collaborator
// ---------------------------------------------------------------------------

#[tokio::test]
async fn face_verify_without_collaborator_is_503() {
    let app = test_app();
    let resp = app
        .oneshot(post_json(
            "/v1/identity/face-verify",
            json!({"reference_ref": "uploads/a.jpg", "candidate_ref": "uploads/b.jpg"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}
