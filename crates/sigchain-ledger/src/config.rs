//! Ledger adapter configuration.
//!
//! Configures the RPC endpoint, the deployed contract address, and the
//! anchoring key. Defaults point at a local development node. Override
//! via environment variables or explicit construction for tests.

use url::Url;

/// Configuration for connecting to the anchoring ledger node.
///
/// Custom `Debug` redacts the anchoring key to prevent credential
/// leakage in log output.
#[derive(Clone)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint of the ledger node.
    /// Default: <http://127.0.0.1:8545>
    pub rpc_url: Url,
    /// Address of the deployed certificate contract.
    pub contract_address: String,
    /// Hex-encoded Ed25519 anchoring key (64 hex chars). When absent,
    /// an ephemeral key is generated at startup.
    pub anchor_key_hex: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for LedgerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerConfig")
            .field("rpc_url", &self.rpc_url)
            .field("contract_address", &self.contract_address)
            .field("anchor_key_hex", &self.anchor_key_hex.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl LedgerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SIGCHAIN_LEDGER_RPC_URL` (default: `http://127.0.0.1:8545`)
    /// - `SIGCHAIN_LEDGER_CONTRACT` (required)
    /// - `SIGCHAIN_ANCHOR_KEY_HEX` (optional; ephemeral key if unset)
    /// - `SIGCHAIN_LEDGER_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let contract_address =
            std::env::var("SIGCHAIN_LEDGER_CONTRACT").map_err(|_| ConfigError::MissingContract)?;

        Ok(Self {
            rpc_url: env_url("SIGCHAIN_LEDGER_RPC_URL", "http://127.0.0.1:8545")?,
            contract_address,
            anchor_key_hex: std::env::var("SIGCHAIN_ANCHOR_KEY_HEX").ok(),
            timeout_secs: std::env::var("SIGCHAIN_LEDGER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        })
    }

    /// Configuration pointing at a local node (for tests).
    pub fn local(port: u16, contract_address: &str) -> Result<Self, ConfigError> {
        let rpc_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            rpc_url,
            contract_address: contract_address.to_string(),
            anchor_key_hex: None,
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SIGCHAIN_LEDGER_CONTRACT environment variable is required")]
    MissingContract,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}
