//! # sigchain-api — Axum API Surface
//!
//! The HTTP surface over the Sigchain coordinators.
//!
//! ## API Surface
//!
//! | Route                          | Module                       |
//! |--------------------------------|------------------------------|
//! | `POST   /v1/certificates`      | [`routes::certificates`]     |
//! | `GET    /v1/certificates`      | [`routes::certificates`]     |
//! | `GET    /v1/certificates/:id`  | [`routes::certificates`]     |
//! | `DELETE /v1/certificates/:id`  | [`routes::certificates`]     |
//! | `GET /v1/certificates/:id/verify` | [`routes::certificates`]  |
//! | `POST /v1/identity/face-verify`| [`routes::identity`]         |
//! | `GET /openapi.json`            | [`openapi`]                  |
//! | `GET /health/*`                | unauthenticated probes       |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic in handlers — they delegate to the coordinators
//!   in `sigchain-service`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod auth;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::AuthConfig;
use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

pub use error::AppError;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) are mounted outside the auth middleware
/// so they remain accessible without credentials.
pub fn app(state: AppState) -> Router {
    let auth_config = AuthConfig {
        token: state.config.auth_token.clone(),
    };
    let metrics = ApiMetrics::new();

    // Authenticated API routes.
    let api = Router::new()
        .merge(routes::certificates::router())
        .merge(routes::identity::router())
        .merge(openapi::router())
        .layer(from_fn(auth::auth_middleware))
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(axum::Extension(auth_config))
        .layer(axum::Extension(metrics))
        .with_state(state);

    // Unauthenticated health probes.
    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — returns 200 when the application is ready to serve.
async fn readiness() -> &'static str {
    "ready"
}
