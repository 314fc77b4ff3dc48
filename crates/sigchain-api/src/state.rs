//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Holds the record store, the ledger handle, the two coordinators
//! built over them, the optional face-match collaborator client, and
//! application configuration. Clone-friendly via `Arc` internals in
//! each component.

use sigchain_ledger::{AnchorLedger, MemoryLedger};
use sigchain_service::{FaceMatchClient, IssuanceCoordinator, VerificationCoordinator};
use sigchain_store::CertificateStore;

/// Application configuration.
///
/// Custom `Debug` redacts the `auth_token` to prevent credential
/// leakage in logs.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer secret. If `None`, authentication is disabled and
    /// a development identity is injected.
    pub auth_token: Option<String>,
    /// Public base URL under which certificate assets are served.
    pub asset_base_url: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("asset_base_url", &self.asset_base_url)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            asset_base_url: "http://localhost:8080/assets".to_string(),
        }
    }
}

/// Shared application state accessible to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The certificate record store.
    pub store: CertificateStore,
    /// Handle to the anchoring ledger.
    pub ledger: AnchorLedger,
    /// Issuance write-path coordinator.
    pub issuance: IssuanceCoordinator,
    /// Verification read-path coordinator.
    pub verification: VerificationCoordinator,
    /// Face-match collaborator, when configured. Absent means the
    /// face-verify endpoint answers 503.
    pub facematch: Option<FaceMatchClient>,
    /// Application configuration.
    pub config: AppConfig,
}

impl AppState {
    /// In-memory state with default configuration: memory store,
    /// memory ledger, no face-match collaborator. Development and
    /// tests.
    pub fn new() -> Self {
        Self::with_parts(
            AppConfig::default(),
            CertificateStore::in_memory(),
            AnchorLedger::Memory(MemoryLedger::new()),
            None,
        )
    }

    /// Assemble state from explicit parts.
    pub fn with_parts(
        config: AppConfig,
        store: CertificateStore,
        ledger: AnchorLedger,
        facematch: Option<FaceMatchClient>,
    ) -> Self {
        Self {
            issuance: IssuanceCoordinator::new(store.clone(), ledger.clone()),
            verification: VerificationCoordinator::new(store.clone(), ledger.clone()),
            store,
            ledger,
            facematch,
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
