//! # In-Memory Ledger
//!
//! An in-process append-once ledger with the same two operations as the
//! RPC client. Backs development mode (no ledger node configured) and
//! tests, including deterministic write-failure injection for the
//! abort-on-anchor-failure path.
//!
//! Entries are append-once like the real ledger: a second anchor for
//! the same identifier is rejected, and nothing ever deletes an entry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use sigchain_core::{CertificateDigest, CertificateId, Timestamp};

use crate::entry::{AnchorReceipt, LedgerEntry};
use crate::error::LedgerWriteError;

/// In-process append-once ledger.
///
/// Clone-friendly: clones share the underlying entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    entries: Arc<RwLock<HashMap<String, LedgerEntry>>>,
    fail_writes: Arc<AtomicBool>,
    sequence: Arc<AtomicU64>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Anchor a digest. Append-once: a duplicate identifier is rejected.
    pub fn anchor(
        &self,
        identifier: &CertificateId,
        digest: &CertificateDigest,
    ) -> Result<AnchorReceipt, LedgerWriteError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerWriteError::Rejected {
                identifier: identifier.to_string(),
                reason: "write failure injected".to_string(),
            });
        }

        let mut entries = self.entries.write();
        if entries.contains_key(identifier.as_str()) {
            return Err(LedgerWriteError::AlreadyAnchored(identifier.to_string()));
        }

        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction_ref = format!("memtx-{n:016x}");
        entries.insert(
            identifier.as_str().to_string(),
            LedgerEntry {
                identifier: identifier.as_str().to_string(),
                digest: digest.to_hex(),
                anchored_at: Timestamp::now(),
                transaction_ref: Some(transaction_ref.clone()),
            },
        );

        Ok(AnchorReceipt { transaction_ref })
    }

    /// Read the entry for an identifier. `None` when never anchored.
    pub fn lookup(&self, identifier: &CertificateId) -> Option<LedgerEntry> {
        self.entries.read().get(identifier.as_str()).cloned()
    }

    /// Toggle deterministic write failure. While set, every anchor
    /// submission is rejected and nothing is recorded.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Insert or replace an entry directly, bypassing the append-once
    /// rule. Seeding hook for divergence scenarios — a real ledger
    /// offers no such operation.
    pub fn seed_entry(&self, identifier: &str, digest_hex: &str) {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.entries.write().insert(
            identifier.to_string(),
            LedgerEntry {
                identifier: identifier.to_string(),
                digest: digest_hex.to_string(),
                anchored_at: Timestamp::now(),
                transaction_ref: Some(format!("memtx-{n:016x}")),
            },
        );
    }

    /// Number of anchored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the ledger holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
