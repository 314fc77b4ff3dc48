//! # sigchain-api — Binary Entry Point
//!
//! Starts the Axum HTTP server. Configuration comes from the
//! environment:
//!
//! - `PORT` — listen port (default 8080).
//! - `SIGCHAIN_AUTH_TOKEN` — bearer secret; absent disables auth.
//! - `SIGCHAIN_ASSET_BASE_URL` — public base URL for asset references.
//! - `DATABASE_URL` — PostgreSQL record store; absent means in-memory
//!   only.
//! - `SIGCHAIN_LEDGER_CONTRACT` (+ `SIGCHAIN_LEDGER_RPC_URL`,
//!   `SIGCHAIN_ANCHOR_KEY_HEX`) — RPC ledger; absent means the
//!   in-process development ledger.
//! - `SIGCHAIN_FACEMATCH_URL` — face-match collaborator; absent means
//!   face-verify answers 503.

use sigchain_api::state::{AppConfig, AppState};
use sigchain_ledger::{AnchorIdentity, AnchorLedger, LedgerConfig, MemoryLedger, RpcLedgerClient};
use sigchain_service::FaceMatchClient;
use sigchain_store::CertificateStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Build configuration from environment.
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let auth_token = std::env::var("SIGCHAIN_AUTH_TOKEN").ok();
    if auth_token.is_none() {
        tracing::warn!("SIGCHAIN_AUTH_TOKEN not set — authentication disabled");
    }
    let asset_base_url = std::env::var("SIGCHAIN_ASSET_BASE_URL")
        .unwrap_or_else(|_| format!("http://localhost:{port}/assets"));
    let config = AppConfig {
        port,
        auth_token,
        asset_base_url,
    };

    // Record store: PostgreSQL when configured, in-memory otherwise.
    let store = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(std::time::Duration::from_secs(10))
                .connect(&url)
                .await
                .map_err(|e| {
                    tracing::error!("database connection failed: {e}");
                    e
                })?;
            tracing::info!("record store backed by PostgreSQL");
            CertificateStore::with_pool(pool)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set — record store is in-memory only");
            CertificateStore::in_memory()
        }
    };

    // Ensure schema, hydrate, and advance the identifier sequence.
    store.bootstrap().await.map_err(|e| {
        tracing::error!("store bootstrap failed: {e}");
        e
    })?;

    // Ledger: RPC client when a contract is configured, in-process
    // development ledger otherwise. Anything other than a plainly
    // absent contract is a startup failure, not a silent fallback.
    let ledger = match LedgerConfig::from_env() {
        Ok(ledger_config) => {
            let identity = match &ledger_config.anchor_key_hex {
                Some(hex) => AnchorIdentity::from_hex(hex).map_err(|e| {
                    tracing::error!("invalid SIGCHAIN_ANCHOR_KEY_HEX: {e}");
                    e
                })?,
                None => AnchorIdentity::generate(),
            };
            let client = RpcLedgerClient::new(&ledger_config, identity)?;
            tracing::info!(
                rpc_url = %ledger_config.rpc_url,
                anchor_address = %client.anchor_address(),
                "anchoring to ledger node"
            );
            AnchorLedger::Rpc(client)
        }
        Err(sigchain_ledger::ConfigError::MissingContract) => {
            tracing::warn!(
                "SIGCHAIN_LEDGER_CONTRACT not set — using the in-process development ledger"
            );
            AnchorLedger::Memory(MemoryLedger::new())
        }
        Err(e) => {
            tracing::error!("ledger configuration invalid: {e}");
            return Err(e.into());
        }
    };

    // Face-match collaborator, if configured.
    let facematch = FaceMatchClient::from_env().map_err(|e| {
        tracing::error!("face-match configuration invalid: {e}");
        e
    })?;
    if facematch.is_none() {
        tracing::info!("face-match collaborator not configured — face-verify answers 503");
    }

    let state = AppState::with_parts(config, store, ledger, facematch);
    let app = sigchain_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Sigchain API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
