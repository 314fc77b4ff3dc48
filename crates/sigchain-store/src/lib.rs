//! # sigchain-store — Certificate Record Store
//!
//! Persists certificate records keyed by identifier and owns the one
//! piece of shared mutable state in the system: the identifier
//! sequence.
//!
//! ## Architecture
//!
//! The in-memory index is the authoritative in-process view — reads
//! are synchronous and never touch the database. When a PostgreSQL
//! pool is configured, writes go through the database first (a failed
//! database write leaves the in-memory index untouched) and the index
//! is hydrated from the database at startup. Without a pool the store
//! runs in memory-only mode (development and tests).
//!
//! ## Identifier Sequence
//!
//! Allocation is linearizable in both modes: a mutex-guarded counter
//! in memory mode, a single-statement `UPDATE … RETURNING` in Postgres
//! mode. The naive read-max-then-add-one pattern is a race and appears
//! nowhere in this crate.
//!
//! ## Orphaned-Anchor Journal
//!
//! When issuance anchors a digest but record persistence then fails,
//! the anchored entry is journaled here so operators can reconcile.
//! The ledger is append-only; the journal is the local side of that
//! ledger entry with no matching record.

mod memory;
mod pg;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;

use sigchain_core::{CertificateId, CertificateRecord, Timestamp};

use memory::MemoryIndex;

/// Record store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An insert collided with an existing identifier. Cannot happen
    /// when identifiers come from the allocator; indicates a caller
    /// bypassing allocation.
    #[error("duplicate certificate identifier {0}")]
    DuplicateIdentifier(String),
}

/// A ledger anchor with no matching local record, journaled for
/// operator reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedAnchor {
    /// Identifier whose anchor exists on the ledger.
    pub identifier: CertificateId,
    /// Digest as anchored, lowercase hex.
    pub digest: String,
    /// Ledger transaction reference.
    pub transaction_ref: String,
    /// When the ledger accepted the anchor.
    pub anchored_at: Timestamp,
    /// When the failed persistence was journaled.
    pub recorded_at: Timestamp,
}

/// The certificate record store.
///
/// Clone-friendly: clones share the in-memory index and the pool.
#[derive(Debug, Clone)]
pub struct CertificateStore {
    mem: MemoryIndex,
    pool: Option<PgPool>,
}

impl CertificateStore {
    /// Memory-only store (development and tests).
    pub fn in_memory() -> Self {
        Self {
            mem: MemoryIndex::new(),
            pool: None,
        }
    }

    /// Store backed by PostgreSQL write-through.
    ///
    /// Call [`CertificateStore::bootstrap`] before serving traffic.
    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            mem: MemoryIndex::new(),
            pool: Some(pool),
        }
    }

    /// Whether a database pool is configured.
    pub fn is_durable(&self) -> bool {
        self.pool.is_some()
    }

    /// Bootstrap the store: ensure the schema exists, hydrate the
    /// in-memory index, and advance the sequence past every identifier
    /// already issued. No-op in memory-only mode.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        let pool = match &self.pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        pg::ensure_schema(pool).await?;

        let records = pg::load_all(pool).await?;
        let count = records.len();
        for record in records {
            self.mem.insert(record);
        }

        let orphans = pg::load_orphans(pool).await?;
        for orphan in orphans {
            self.mem.push_orphan(orphan);
        }

        let max = self.mem.max_value();
        pg::advance_sequence(pool, max).await?;
        self.mem.bump_sequence_to(max);

        tracing::info!(certificates = count, "hydrated certificate store from database");
        Ok(())
    }

    /// Allocate the next identifier sequence value.
    ///
    /// Linearizable in both modes; see the module docs. This is the
    /// serialized increment the allocator builds on.
    pub async fn allocate_next(&self) -> Result<u64, StoreError> {
        match &self.pool {
            Some(pool) => {
                let value = pg::allocate_next(pool).await?;
                // Keep the in-process counter from ever lagging the
                // database's.
                self.mem.bump_sequence_to(value);
                Ok(value)
            }
            None => Ok(self.mem.allocate()),
        }
    }

    /// Persist a record as one logical write.
    ///
    /// Database first, then the in-memory index: a failed database
    /// write leaves no trace in memory, so the caller can treat the
    /// whole insert as not-happened.
    pub async fn insert(&self, record: CertificateRecord) -> Result<(), StoreError> {
        if self.mem.contains(&record.identifier) {
            return Err(StoreError::DuplicateIdentifier(
                record.identifier.to_string(),
            ));
        }
        if let Some(pool) = &self.pool {
            pg::insert(pool, &record).await?;
        }
        self.mem.insert(record);
        Ok(())
    }

    /// Fetch a record by identifier.
    pub fn get(&self, id: &CertificateId) -> Option<CertificateRecord> {
        self.mem.get(id)
    }

    /// Fetch a record by identifier, scoped to its owner.
    pub fn get_owned(&self, id: &CertificateId, issuer_email: &str) -> Option<CertificateRecord> {
        self.mem
            .get(id)
            .filter(|record| record.issuer_email == issuer_email)
    }

    /// All records owned by an issuer, newest first.
    pub fn list_by_issuer(&self, issuer_email: &str) -> Vec<CertificateRecord> {
        self.mem.list_by_issuer(issuer_email)
    }

    /// The highest identifier ever persisted, if any.
    pub fn max_identifier(&self) -> Option<CertificateId> {
        self.mem.max_identifier()
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.mem.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hard-delete an owner's record. Returns whether a record was
    /// removed. Deletion never retracts the ledger anchor.
    pub async fn delete(&self, id: &CertificateId, issuer_email: &str) -> Result<bool, StoreError> {
        if self.get_owned(id, issuer_email).is_none() {
            return Ok(false);
        }
        if let Some(pool) = &self.pool {
            pg::delete(pool, id, issuer_email).await?;
        }
        Ok(self.mem.remove(id).is_some())
    }

    /// Journal an anchored digest whose record failed to persist.
    ///
    /// Best-effort: the issuance has already failed, so a journal
    /// write failure is logged rather than propagated — the in-memory
    /// journal entry survives either way.
    pub async fn journal_orphaned_anchor(&self, orphan: OrphanedAnchor) {
        tracing::error!(
            identifier = %orphan.identifier,
            transaction_ref = %orphan.transaction_ref,
            "anchored digest has no persisted record — journaled for reconciliation"
        );
        if let Some(pool) = &self.pool {
            if let Err(e) = pg::insert_orphan(pool, &orphan).await {
                tracing::error!(
                    identifier = %orphan.identifier,
                    error = %e,
                    "failed to persist orphaned-anchor journal entry"
                );
            }
        }
        self.mem.push_orphan(orphan);
    }

    /// The orphaned-anchor journal, oldest first.
    pub fn orphaned_anchors(&self) -> Vec<OrphanedAnchor> {
        self.mem.orphans()
    }
}
