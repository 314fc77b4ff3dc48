//! # JSON-RPC Ledger Client
//!
//! Talks to the ledger node's JSON-RPC 2.0 endpoint. Two methods are
//! used, mirroring the deployed contract's two operations:
//!
//! | Method                      | Operation                       |
//! |-----------------------------|---------------------------------|
//! | `sigchain_storeCertificate` | Anchor `(identifier, digest)`   |
//! | `sigchain_getCertificate`   | Read the entry for an identifier|
//!
//! ## Write Serialization
//!
//! The node sequences transactions per account. Concurrent anchors from
//! the shared anchoring identity would race on that ordering, so the
//! write path holds an async mutex across the whole submission. Writes
//! are never retried: after an ambiguous transport failure the
//! transaction may have landed, and a blind retry could anchor twice.
//!
//! Reads are idempotent and go through [`crate::retry::retry_send`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sigchain_core::{CertificateDigest, CertificateId};

use crate::config::{ConfigError, LedgerConfig};
use crate::entry::{AnchorReceipt, LedgerEntry, RawCertificateResult};
use crate::error::{LedgerReadError, LedgerWriteError};
use crate::identity::AnchorIdentity;
use crate::retry::retry_send;

const METHOD_STORE: &str = "sigchain_storeCertificate";
const METHOD_GET: &str = "sigchain_getCertificate";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<P: Serialize> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: P,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct RpcResponse<T> {
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// Parameters for `sigchain_storeCertificate`.
#[derive(Debug, Serialize)]
struct StoreParams<'a> {
    contract: &'a str,
    from: String,
    identifier: &'a str,
    digest: String,
    signature: String,
}

/// Result of `sigchain_storeCertificate`.
#[derive(Debug, Deserialize)]
struct StoreResult {
    #[serde(alias = "transactionHash", alias = "transaction_hash")]
    transaction_ref: String,
}

/// Parameters for `sigchain_getCertificate`.
#[derive(Debug, Serialize)]
struct GetParams<'a> {
    contract: &'a str,
    identifier: &'a str,
}

/// JSON-RPC client for the anchoring ledger node.
#[derive(Debug, Clone)]
pub struct RpcLedgerClient {
    http: reqwest::Client,
    rpc_url: url::Url,
    contract_address: String,
    identity: Arc<AnchorIdentity>,
    /// Serializes writes from the shared anchoring identity. Must be a
    /// tokio mutex — it is held across the submission await.
    write_lock: Arc<tokio::sync::Mutex<()>>,
    request_id: Arc<AtomicU64>,
}

impl RpcLedgerClient {
    /// Build a client from configuration and an anchoring identity.
    pub fn new(config: &LedgerConfig, identity: AnchorIdentity) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            http,
            rpc_url: config.rpc_url.clone(),
            contract_address: config.contract_address.clone(),
            identity: Arc::new(identity),
            write_lock: Arc::new(tokio::sync::Mutex::new(())),
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// The public address of the anchoring identity.
    pub fn anchor_address(&self) -> String {
        self.identity.address()
    }

    fn next_request_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Submit an anchor transaction and wait for acceptance.
    ///
    /// Holds the write lock for the full round trip so submissions from
    /// the shared identity reach the node strictly ordered. Never
    /// retried — see the module docs.
    pub async fn anchor(
        &self,
        identifier: &CertificateId,
        digest: &CertificateDigest,
    ) -> Result<AnchorReceipt, LedgerWriteError> {
        let digest_hex = digest.to_hex();
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_request_id(),
            method: METHOD_STORE,
            params: StoreParams {
                contract: &self.contract_address,
                from: self.identity.address(),
                identifier: identifier.as_str(),
                digest: digest_hex.clone(),
                signature: self.identity.sign_submission(identifier.as_str(), &digest_hex),
            },
        };

        let _guard = self.write_lock.lock().await;
        tracing::debug!(identifier = %identifier, "submitting anchor transaction");

        let resp = self
            .http
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|source| LedgerWriteError::Transport {
                endpoint: METHOD_STORE.to_string(),
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerWriteError::Rejected {
                identifier: identifier.to_string(),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let body: RpcResponse<StoreResult> =
            resp.json().await.map_err(|e| LedgerWriteError::Decode {
                endpoint: METHOD_STORE.to_string(),
                detail: e.to_string(),
            })?;

        if let Some(err) = body.error {
            return Err(LedgerWriteError::Rejected {
                identifier: identifier.to_string(),
                reason: format!("{} (code {})", err.message, err.code),
            });
        }

        let result = body.result.ok_or_else(|| LedgerWriteError::Decode {
            endpoint: METHOD_STORE.to_string(),
            detail: "response carried neither result nor error".to_string(),
        })?;

        if result.transaction_ref.trim().is_empty() {
            return Err(LedgerWriteError::Decode {
                endpoint: METHOD_STORE.to_string(),
                detail: "empty transaction reference".to_string(),
            });
        }

        tracing::info!(
            identifier = %identifier,
            transaction_ref = %result.transaction_ref,
            "anchor accepted"
        );

        Ok(AnchorReceipt {
            transaction_ref: result.transaction_ref,
        })
    }

    /// Read the ledger's entry for an identifier.
    ///
    /// `Ok(None)` when the ledger has no entry. Transport failures are
    /// retried with backoff before surfacing as [`LedgerReadError`].
    pub async fn lookup(
        &self,
        identifier: &CertificateId,
    ) -> Result<Option<LedgerEntry>, LedgerReadError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_request_id(),
            method: METHOD_GET,
            params: GetParams {
                contract: &self.contract_address,
                identifier: identifier.as_str(),
            },
        };

        let resp = retry_send(|| {
            self.http
                .post(self.rpc_url.clone())
                .json(&request)
                .send()
        })
        .await
        .map_err(|source| LedgerReadError::Transport {
            endpoint: METHOD_GET.to_string(),
            source,
        })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(LedgerReadError::Status {
                endpoint: METHOD_GET.to_string(),
                status,
                body,
            });
        }

        let body: RpcResponse<RawCertificateResult> =
            resp.json().await.map_err(|e| LedgerReadError::Decode {
                endpoint: METHOD_GET.to_string(),
                detail: e.to_string(),
            })?;

        if let Some(err) = body.error {
            return Err(LedgerReadError::Rpc {
                endpoint: METHOD_GET.to_string(),
                code: err.code,
                message: err.message,
            });
        }

        // A null result is the node's own "no entry" form.
        let raw = match body.result {
            Some(raw) => raw,
            None => return Ok(None),
        };

        raw.normalize(identifier.as_str())
            .map_err(|detail| LedgerReadError::Decode {
                endpoint: METHOD_GET.to_string(),
                detail,
            })
    }
}
