//! # Authentication Middleware
//!
//! Bearer token middleware that hands the core a verified issuer
//! identity. Session management and user accounts are an external
//! collaborator's concern — this layer only authenticates the shared
//! secret and binds the caller's issuer email.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {issuer_email}:{secret}   — identity-bearing format
//! Bearer {secret}                   — legacy format (default operator identity)
//! ```
//!
//! The secret is compared in constant time. When no secret is
//! configured, authentication is disabled and a development identity
//! is injected into every request.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use subtle::ConstantTimeEq;

use crate::error::{AppError, ErrorBody, ErrorDetail};

/// Identity injected when authentication is disabled (development).
const DEV_IDENTITY: &str = "dev@sigchain.local";

/// Identity bound to legacy bare-secret tokens.
const LEGACY_IDENTITY: &str = "operator@sigchain.local";

/// Auth configuration injected as a request extension.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The shared bearer secret. `None` disables authentication.
    pub token: Option<String>,
}

/// Identity of the authenticated caller, available to all route
/// handlers via Axum's `FromRequestParts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The caller's verified issuer email. Certificate ownership is
    /// scoped to this value.
    pub issuer_email: String,
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// Constant-time equality over byte strings of possibly different
/// lengths. Length is not secret; content is.
fn secret_matches(candidate: &str, expected: &str) -> bool {
    candidate.len() == expected.len()
        && bool::from(candidate.as_bytes().ct_eq(expected.as_bytes()))
}

/// 401 response with the standard error body.
fn unauthorized(message: &str) -> Response {
    let body = ErrorBody {
        error: ErrorDetail {
            code: "UNAUTHORIZED".to_string(),
            message: message.to_string(),
        },
    };
    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// Bearer token middleware.
///
/// On success, injects a [`CallerIdentity`] into the request
/// extensions. With no configured secret, every request gets the
/// development identity.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let config = request.extensions().get::<AuthConfig>().cloned();

    let expected = match config.and_then(|c| c.token) {
        Some(token) => token,
        None => {
            request.extensions_mut().insert(CallerIdentity {
                issuer_email: DEV_IDENTITY.to_string(),
            });
            return next.run(request).await;
        }
    };

    let header_value = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(value) => value,
        None => return unauthorized("missing Authorization header"),
    };

    let bearer = match header_value.strip_prefix("Bearer ") {
        Some(bearer) => bearer.trim(),
        None => return unauthorized("Authorization header is not a Bearer token"),
    };

    // "{issuer_email}:{secret}" — split at the last colon so emails
    // containing colons cannot smuggle a short secret.
    let identity = match bearer.rsplit_once(':') {
        Some((email, secret)) => {
            if !secret_matches(secret, &expected) {
                return unauthorized("invalid token");
            }
            if email.trim().is_empty() {
                return unauthorized("token carries an empty issuer identity");
            }
            CallerIdentity {
                issuer_email: email.trim().to_string(),
            }
        }
        None => {
            // Legacy bare-secret format.
            if !secret_matches(bearer, &expected) {
                return unauthorized("invalid token");
            }
            CallerIdentity {
                issuer_email: LEGACY_IDENTITY.to_string(),
            }
        }
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_matches_exact() {
        assert!(secret_matches("s3cret", "s3cret"));
        assert!(!secret_matches("s3cret", "other1"));
        assert!(!secret_matches("s3cre", "s3cret"));
        assert!(!secret_matches("", "s3cret"));
    }

    #[test]
    fn caller_identity_is_comparable() {
        let a = CallerIdentity {
            issuer_email: "a@example.com".to_string(),
        };
        assert_eq!(a.clone(), a);
    }
}
