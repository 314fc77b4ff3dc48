//! # sigchain-ledger — Ledger Client Adapter
//!
//! The only path between Sigchain and the append-only ledger. The
//! adapter exposes exactly two logical operations:
//!
//! - **anchor** — submit `(identifier, digest)` as a write transaction
//!   and wait for acceptance, returning the transaction reference.
//! - **lookup** — read the ledger's record for an identifier,
//!   normalized to one canonical [`LedgerEntry`] shape. An absent entry
//!   is a legitimate `None`, not an error.
//!
//! ## Heterogeneous Result Shapes
//!
//! Ledger node libraries return contract call results as positional
//! arrays or named objects depending on version. Normalization happens
//! here, at the adapter boundary — heterogeneous shapes never leak past
//! this crate.
//!
//! ## Write Discipline
//!
//! Anchoring is a single irreversible external side effect. Writes are
//! serialized through the shared anchoring identity (ledger nodes
//! enforce per-account transaction ordering) and are never retried
//! automatically: a retry after an ambiguous timeout could anchor the
//! same identifier twice. Reads are idempotent and retry with backoff.

pub mod config;
pub mod entry;
pub mod error;
pub mod identity;
pub mod memory;
pub(crate) mod retry;
pub mod rpc;

pub use config::{ConfigError, LedgerConfig};
pub use entry::{AnchorReceipt, LedgerEntry};
pub use error::{LedgerReadError, LedgerWriteError};
pub use identity::AnchorIdentity;
pub use memory::MemoryLedger;
pub use rpc::RpcLedgerClient;

use sigchain_core::{CertificateDigest, CertificateId};

/// Handle to whichever ledger backs this deployment.
///
/// `Rpc` talks to a real ledger node; `Memory` is the in-process ledger
/// used in development mode and tests. Both provide the same two
/// operations with the same semantics.
#[derive(Debug, Clone)]
pub enum AnchorLedger {
    /// JSON-RPC client against a ledger node.
    Rpc(RpcLedgerClient),
    /// In-process append-once ledger.
    Memory(MemoryLedger),
}

impl AnchorLedger {
    /// Anchor a certificate digest on the ledger.
    ///
    /// Blocks until the transaction is accepted or fails. On failure
    /// the caller must not persist a record as anchored.
    pub async fn anchor(
        &self,
        identifier: &CertificateId,
        digest: &CertificateDigest,
    ) -> Result<AnchorReceipt, LedgerWriteError> {
        match self {
            Self::Rpc(client) => client.anchor(identifier, digest).await,
            Self::Memory(ledger) => ledger.anchor(identifier, digest),
        }
    }

    /// Read the ledger's entry for an identifier.
    ///
    /// `Ok(None)` means the ledger has no entry — a routine outcome,
    /// distinct from a read failure.
    pub async fn lookup(
        &self,
        identifier: &CertificateId,
    ) -> Result<Option<LedgerEntry>, LedgerReadError> {
        match self {
            Self::Rpc(client) => client.lookup(identifier).await,
            Self::Memory(ledger) => Ok(ledger.lookup(identifier)),
        }
    }
}
