//! # Verification Coordinator
//!
//! The three-way consistency check behind every verification call:
//!
//! 1. The record store's copy of the certificate.
//! 2. The digest recomputed from the stored content fields.
//! 3. The digest anchored on the ledger.
//!
//! `Verified` requires stored == recomputed == anchored. Recomputing
//! from the stored fields catches local tampering that a plain
//! stored-vs-ledger comparison would miss.
//!
//! Verdicts are routine return values — "does not verify" is expected
//! output, not a fault. Only infrastructure failures (a ledger read
//! error, as distinct from an absent entry) surface as errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sigchain_core::{sha256_digest, CertificateId, Timestamp};
use sigchain_ledger::{AnchorLedger, LedgerReadError};
use sigchain_store::CertificateStore;

/// Verification verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Stored, recomputed, and anchored digests all match.
    Verified,
    /// The ledger holds no entry for this identifier.
    NotAnchored,
    /// Some pair of the three digests disagrees.
    TamperedOrMismatched,
    /// The record store holds no certificate for this identifier.
    CertificateUnknown,
}

impl Verdict {
    /// String form of the verdict.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "VERIFIED",
            Self::NotAnchored => "NOT_ANCHORED",
            Self::TamperedOrMismatched => "TAMPERED_OR_MISMATCHED",
            Self::CertificateUnknown => "CERTIFICATE_UNKNOWN",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one verification call.
///
/// Transient — produced fresh on every call, never cached or
/// persisted. Carries the compared digests so a verifier can see what
/// disagreed, and the anchoring proof taken from the ledger (not from
/// the local record).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// The identifier that was checked.
    pub identifier: CertificateId,
    /// The verdict.
    pub verdict: Verdict,
    /// Digest stored at issuance time, when a record exists.
    pub stored_digest: Option<String>,
    /// Digest recomputed from the stored content fields.
    pub recomputed_digest: Option<String>,
    /// Digest as anchored on the ledger, when an entry exists.
    pub ledger_digest: Option<String>,
    /// Anchoring timestamp, from the ledger.
    pub anchored_at: Option<Timestamp>,
    /// Transaction reference, from the ledger when it reports one.
    pub transaction_ref: Option<String>,
}

impl VerificationReport {
    fn unknown(identifier: CertificateId) -> Self {
        Self {
            identifier,
            verdict: Verdict::CertificateUnknown,
            stored_digest: None,
            recomputed_digest: None,
            ledger_digest: None,
            anchored_at: None,
            transaction_ref: None,
        }
    }
}

/// Verification failure — infrastructure only, never a verdict.
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The ledger could not be read. Distinct from an absent entry,
    /// which is the `NotAnchored` verdict.
    #[error("ledger read failed: {0}")]
    Ledger(#[from] LedgerReadError),
}

/// Coordinates the verification read path.
#[derive(Debug, Clone)]
pub struct VerificationCoordinator {
    store: CertificateStore,
    ledger: AnchorLedger,
}

impl VerificationCoordinator {
    /// Build a coordinator over the given store and ledger.
    pub fn new(store: CertificateStore, ledger: AnchorLedger) -> Self {
        Self { store, ledger }
    }

    /// Run the three-way consistency check for an identifier.
    pub async fn verify(
        &self,
        identifier: &CertificateId,
    ) -> Result<VerificationReport, VerificationError> {
        // 1. Local record.
        let record = match self.store.get(identifier) {
            Some(record) => record,
            None => {
                return Ok(VerificationReport::unknown(identifier.clone()));
            }
        };

        let stored_hex = record.digest.to_hex();
        let recomputed = sha256_digest(&record.canonical_fields().canonical_bytes());
        let recomputed_hex = recomputed.to_hex();

        // 2. Ledger entry. A read failure is a service error; an absent
        //    entry is a verdict.
        let entry = match self.ledger.lookup(identifier).await? {
            Some(entry) => entry,
            None => {
                return Ok(VerificationReport {
                    identifier: identifier.clone(),
                    verdict: Verdict::NotAnchored,
                    stored_digest: Some(stored_hex),
                    recomputed_digest: Some(recomputed_hex),
                    ledger_digest: None,
                    anchored_at: None,
                    transaction_ref: None,
                });
            }
        };

        // 3. Three-way comparison. The anchoring proof comes from the
        //    ledger, never from the local record.
        let consistent = stored_hex == recomputed_hex && entry.digest == stored_hex;
        let verdict = if consistent {
            Verdict::Verified
        } else {
            Verdict::TamperedOrMismatched
        };

        if verdict != Verdict::Verified {
            tracing::warn!(
                identifier = %identifier,
                stored = %stored_hex,
                recomputed = %recomputed_hex,
                ledger = %entry.digest,
                "certificate failed verification"
            );
        }

        Ok(VerificationReport {
            identifier: identifier.clone(),
            verdict,
            stored_digest: Some(stored_hex),
            recomputed_digest: Some(recomputed_hex),
            ledger_digest: Some(entry.digest),
            anchored_at: Some(entry.anchored_at),
            transaction_ref: entry.transaction_ref,
        })
    }
}
