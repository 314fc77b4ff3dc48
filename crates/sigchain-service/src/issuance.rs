//! # Issuance Coordinator
//!
//! Orchestrates one certificate issuance: validate → allocate → hash →
//! anchor → persist.
//!
//! ## Effect Ordering
//!
//! Anchoring is a precondition for persistence, not a best-effort
//! afterthought. On a ledger write failure the whole issuance aborts
//! with no record persisted. The reverse window — a successful anchor
//! followed by a failed persist — cannot be rolled back (the ledger is
//! append-only), so the anchored entry is journaled for operator
//! reconciliation and the issuance still fails.
//!
//! Validation runs before allocation so invalid requests never consume
//! a sequence value. Gaps caused by post-allocation failures (a ledger
//! abort) are acceptable and are not corruption.
//!
//! ## Cancellation
//!
//! Once the ledger submission is sent it cannot be recalled, so an
//! issuance must run to a definite outcome even if the client
//! disconnects. [`IssuanceCoordinator::issue_detached`] runs the flow
//! on an independent task that survives the caller being dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use sigchain_core::{
    normalize_client_ip, sha256_digest, AssetRefs, CanonicalFields, CertificateRecord,
    IssuanceFields, Timestamp, ValidationError,
};
use sigchain_ledger::{AnchorLedger, LedgerWriteError};
use sigchain_store::{CertificateStore, OrphanedAnchor, StoreError};

use crate::allocator::IdentifierAllocator;

/// One issuance request: content fields, optional asset references,
/// and the originating network address as reported by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceRequest {
    /// Caller-supplied content fields.
    pub fields: IssuanceFields,
    /// Optional asset references (opaque paths or URLs).
    #[serde(default)]
    pub assets: AssetRefs,
    /// Raw client address; normalized before storage.
    #[serde(default)]
    pub network_address: String,
}

/// Issuance failure.
#[derive(Debug, Error)]
pub enum IssuanceError {
    /// Input validation failed. No identifier was consumed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The record store failed before anchoring. Nothing was anchored
    /// or persisted.
    #[error("record store failure: {0}")]
    Store(StoreError),

    /// The ledger refused or failed the anchor submission. Nothing was
    /// persisted.
    #[error("ledger anchoring failed: {0}")]
    Anchor(#[from] LedgerWriteError),

    /// Record persistence failed after a successful anchor. The
    /// anchored digest has been journaled for reconciliation.
    #[error("record persistence failed after anchoring (journaled): {0}")]
    Persist(StoreError),

    /// The detached issuance task failed to run to completion.
    #[error("issuance task failed: {0}")]
    Task(String),
}

/// Coordinates the issuance write path.
///
/// Clone-friendly: clones share the store, ledger handle, and
/// allocator.
#[derive(Debug, Clone)]
pub struct IssuanceCoordinator {
    allocator: IdentifierAllocator,
    store: CertificateStore,
    ledger: AnchorLedger,
}

impl IssuanceCoordinator {
    /// Build a coordinator over the given store and ledger.
    pub fn new(store: CertificateStore, ledger: AnchorLedger) -> Self {
        Self {
            allocator: IdentifierAllocator::new(store.clone()),
            store,
            ledger,
        }
    }

    /// Issue a certificate for the verified issuer identity.
    ///
    /// Returns the complete persisted record, including the identifier
    /// and the anchor's transaction reference.
    pub async fn issue(
        &self,
        issuer_email: &str,
        request: IssuanceRequest,
    ) -> Result<CertificateRecord, IssuanceError> {
        // 1. Validate before allocation — invalid input must not
        //    consume a sequence value.
        request.fields.validate()?;

        // 2. Allocate the identifier.
        let identifier = self
            .allocator
            .next()
            .await
            .map_err(IssuanceError::Store)?;
        tracing::debug!(identifier = %identifier, issuer = issuer_email, "identifier allocated");

        // 3. Digest over the canonical content fields.
        let fields = &request.fields;
        let canonical = CanonicalFields::new(
            identifier.as_str(),
            issuer_email,
            &fields.particulars,
            &fields.description,
            &fields.signatory_name,
            &fields.expiry_date,
        );
        let digest = sha256_digest(&canonical.canonical_bytes());

        // 4. Anchor. A failure here aborts the issuance — no record is
        //    persisted, and the identifier gap is acceptable.
        let receipt = self.ledger.anchor(&identifier, &digest).await?;

        // 5. Persist as one logical write.
        let issued_at = Timestamp::now();
        let record = CertificateRecord {
            identifier: identifier.clone(),
            issuer_email: issuer_email.to_string(),
            particulars: fields.particulars.clone(),
            description: fields.description.clone(),
            signatory_name: fields.signatory_name.clone(),
            expiry_date: fields.expiry_date.clone(),
            location: fields.location.clone(),
            creation_date: issued_at.date_string(),
            creation_time: issued_at.time_string(),
            network_address: normalize_client_ip(&request.network_address),
            assets: request.assets,
            digest,
            transaction_ref: Some(receipt.transaction_ref.clone()),
        };

        if let Err(e) = self.store.insert(record.clone()).await {
            // The anchor is irreversible; journal it so operators can
            // reconcile, then report the issuance as failed.
            self.store
                .journal_orphaned_anchor(OrphanedAnchor {
                    identifier,
                    digest: record.digest.to_hex(),
                    transaction_ref: receipt.transaction_ref,
                    anchored_at: issued_at,
                    recorded_at: Timestamp::now(),
                })
                .await;
            return Err(IssuanceError::Persist(e));
        }

        tracing::info!(
            identifier = %record.identifier,
            transaction_ref = record.transaction_ref.as_deref().unwrap_or(""),
            "certificate issued"
        );
        Ok(record)
    }

    /// Issue on an independent task that survives caller cancellation.
    ///
    /// The HTTP layer's request future is dropped when the client
    /// disconnects; a ledger submission already in flight must still
    /// run to a definite outcome. The spawned task completes (and
    /// persists or journals) regardless of whether this future is
    /// polled to the end.
    pub async fn issue_detached(
        &self,
        issuer_email: String,
        request: IssuanceRequest,
    ) -> Result<CertificateRecord, IssuanceError> {
        let coordinator = self.clone();
        let handle = tokio::spawn(async move {
            coordinator.issue(&issuer_email, request).await
        });
        match handle.await {
            Ok(result) => result,
            Err(e) => Err(IssuanceError::Task(e.to_string())),
        }
    }
}
