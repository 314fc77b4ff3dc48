//! Ledger adapter error types.
//!
//! Write and read failures are deliberately separate types: a failed
//! anchor aborts issuance, while a failed lookup is a verification
//! service error — and neither is ever conflated with "no entry found",
//! which is a routine `None`.

use thiserror::Error;

/// Failure submitting an anchor transaction. The caller must not
/// persist a record as anchored after receiving one of these.
#[derive(Debug, Error)]
pub enum LedgerWriteError {
    /// Transport failure — the node was unreachable or timed out. The
    /// submission outcome is unknown; the adapter does not retry.
    #[error("ledger transport failure calling {endpoint}: {source}")]
    Transport {
        /// The logical RPC endpoint.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The node accepted the request but rejected the transaction
    /// (out of resources, contract revert, bad signature).
    #[error("ledger rejected anchor for {identifier}: {reason}")]
    Rejected {
        /// Identifier whose anchor was rejected.
        identifier: String,
        /// Node-reported reason.
        reason: String,
    },

    /// The ledger already holds an entry for this identifier. Anchoring
    /// is append-once; a duplicate submission is a protocol violation
    /// upstream of the adapter.
    #[error("anchor for {0} already exists on the ledger")]
    AlreadyAnchored(String),

    /// The node's response could not be interpreted.
    #[error("malformed ledger response from {endpoint}: {detail}")]
    Decode {
        /// The logical RPC endpoint.
        endpoint: String,
        /// What was wrong with the response.
        detail: String,
    },
}

/// Failure reading a ledger entry. Distinct from `Ok(None)` — an absent
/// entry is a legitimate outcome, not an error.
#[derive(Debug, Error)]
pub enum LedgerReadError {
    /// Transport failure after retries were exhausted.
    #[error("ledger transport failure calling {endpoint}: {source}")]
    Transport {
        /// The logical RPC endpoint.
        endpoint: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The node returned a non-success HTTP status.
    #[error("ledger endpoint {endpoint} returned HTTP {status}: {body}")]
    Status {
        /// The logical RPC endpoint.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The node returned a JSON-RPC error object.
    #[error("ledger RPC error from {endpoint}: {message} (code {code})")]
    Rpc {
        /// The logical RPC endpoint.
        endpoint: String,
        /// JSON-RPC error code.
        code: i64,
        /// JSON-RPC error message.
        message: String,
    },

    /// The node's response could not be normalized.
    #[error("malformed ledger response from {endpoint}: {detail}")]
    Decode {
        /// The logical RPC endpoint.
        endpoint: String,
        /// What was wrong with the response.
        detail: String,
    },
}
