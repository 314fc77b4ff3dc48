//! # Face-Match Collaborator Client
//!
//! Typed client for the external biometric face-matching service. The
//! core consumes a same-person/different-person judgment as a black
//! box; asset references pass through opaquely and no image bytes are
//! ever inspected here.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Errors from face-match calls.
#[derive(Debug, Error)]
pub enum FaceMatchError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        /// The logical endpoint.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The service returned a non-2xx status.
    #[error("face-match service {endpoint} returned {status}: {body}")]
    Api {
        /// The logical endpoint.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        /// The logical endpoint.
        endpoint: String,
        /// The underlying decode error.
        #[source]
        source: reqwest::Error,
    },
    /// Configuration error.
    #[error("face-match configuration error: {0}")]
    Config(String),
}

/// Request body for a comparison call.
#[derive(Debug, Serialize)]
struct CompareRequest<'a> {
    reference_ref: &'a str,
    candidate_ref: &'a str,
}

/// A same-person/different-person judgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceMatchResult {
    /// Whether the two references depict the same person.
    pub is_match: bool,
    /// Service-reported confidence in `[0, 1]`.
    #[serde(default)]
    pub confidence: f64,
}

/// Client for the face-match collaborator.
#[derive(Debug, Clone)]
pub struct FaceMatchClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FaceMatchClient {
    /// Build a client against the service base URL.
    pub fn new(base_url: Url, timeout_secs: u64) -> Result<Self, FaceMatchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FaceMatchError::Config(e.to_string()))?;
        Ok(Self { http, base_url })
    }

    /// Build from `SIGCHAIN_FACEMATCH_URL`, if set.
    ///
    /// Returns `Ok(None)` when the collaborator is not configured —
    /// the API layer answers face-verify requests with 503 in that
    /// case.
    pub fn from_env() -> Result<Option<Self>, FaceMatchError> {
        let raw = match std::env::var("SIGCHAIN_FACEMATCH_URL") {
            Ok(raw) => raw,
            Err(_) => return Ok(None),
        };
        let base_url = Url::parse(&raw)
            .map_err(|e| FaceMatchError::Config(format!("SIGCHAIN_FACEMATCH_URL: {e}")))?;
        let timeout_secs = std::env::var("SIGCHAIN_FACEMATCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);
        Self::new(base_url, timeout_secs).map(Some)
    }

    /// Compare two asset references.
    ///
    /// Calls `POST {base_url}/v1/compare`.
    pub async fn compare(
        &self,
        reference_ref: &str,
        candidate_ref: &str,
    ) -> Result<FaceMatchResult, FaceMatchError> {
        let endpoint = "POST /v1/compare";
        let url = format!("{}v1/compare", self.base_url);

        let resp = self
            .http
            .post(&url)
            .json(&CompareRequest {
                reference_ref,
                candidate_ref,
            })
            .send()
            .await
            .map_err(|source| FaceMatchError::Http {
                endpoint: endpoint.into(),
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FaceMatchError::Api {
                endpoint: endpoint.into(),
                status,
                body,
            });
        }

        resp.json()
            .await
            .map_err(|source| FaceMatchError::Deserialization {
                endpoint: endpoint.into(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_deserializes_with_defaulted_confidence() {
        let full: FaceMatchResult =
            serde_json::from_str(r#"{"is_match": true, "confidence": 0.93}"#).unwrap();
        assert!(full.is_match);
        assert!((full.confidence - 0.93).abs() < f64::EPSILON);

        let bare: FaceMatchResult = serde_json::from_str(r#"{"is_match": false}"#).unwrap();
        assert!(!bare.is_match);
        assert_eq!(bare.confidence, 0.0);
    }

    #[test]
    fn new_builds_client() {
        let client = FaceMatchClient::new(Url::parse("http://127.0.0.1:7000").unwrap(), 5);
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn compare_against_closed_port_is_http_error() {
        let client = FaceMatchClient::new(Url::parse("http://127.0.0.1:1").unwrap(), 1).unwrap();
        let result = client.compare("uploads/a.jpg", "uploads/b.jpg").await;
        assert!(matches!(result, Err(FaceMatchError::Http { .. })));
    }
}
