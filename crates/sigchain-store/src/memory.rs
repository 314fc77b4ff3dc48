//! In-memory certificate index.
//!
//! The authoritative in-process view of the record store: a `BTreeMap`
//! keyed by numeric identifier (so maximum and ordered scans are
//! cheap), a mutex-guarded sequence counter, and the orphaned-anchor
//! journal.
//!
//! All operations are synchronous — the locks are `parking_lot`, never
//! held across `.await` points, and non-poisonable.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use sigchain_core::{CertificateId, CertificateRecord};

use crate::OrphanedAnchor;

/// Thread-safe, clone-shares-data in-memory index.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryIndex {
    records: Arc<RwLock<BTreeMap<u64, CertificateRecord>>>,
    /// Last allocated sequence value. A mutex (not an atomic) because
    /// allocation must be linearizable with sequence advancement after
    /// hydration.
    sequence: Arc<Mutex<u64>>,
    orphans: Arc<RwLock<Vec<OrphanedAnchor>>>,
}

impl MemoryIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequence value. Linearizable: callers never
    /// observe the same value twice.
    pub(crate) fn allocate(&self) -> u64 {
        let mut guard = self.sequence.lock();
        *guard += 1;
        *guard
    }

    /// Advance the sequence so it never re-issues `floor` or anything
    /// below it. Used after hydration and after database-side
    /// allocation.
    pub(crate) fn bump_sequence_to(&self, floor: u64) {
        let mut guard = self.sequence.lock();
        if *guard < floor {
            *guard = floor;
        }
    }

    pub(crate) fn contains(&self, id: &CertificateId) -> bool {
        self.records.read().contains_key(&id.value())
    }

    pub(crate) fn insert(&self, record: CertificateRecord) {
        self.records.write().insert(record.identifier.value(), record);
    }

    pub(crate) fn get(&self, id: &CertificateId) -> Option<CertificateRecord> {
        self.records.read().get(&id.value()).cloned()
    }

    pub(crate) fn remove(&self, id: &CertificateId) -> Option<CertificateRecord> {
        self.records.write().remove(&id.value())
    }

    /// Records owned by an issuer, newest first.
    pub(crate) fn list_by_issuer(&self, issuer_email: &str) -> Vec<CertificateRecord> {
        self.records
            .read()
            .values()
            .rev()
            .filter(|r| r.issuer_email == issuer_email)
            .cloned()
            .collect()
    }

    /// The highest identifier present, if any.
    pub(crate) fn max_identifier(&self) -> Option<CertificateId> {
        self.records
            .read()
            .keys()
            .next_back()
            .map(|&n| CertificateId::from_number(n))
    }

    pub(crate) fn max_value(&self) -> u64 {
        self.records.read().keys().next_back().copied().unwrap_or(0)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.read().len()
    }

    pub(crate) fn push_orphan(&self, orphan: OrphanedAnchor) {
        self.orphans.write().push(orphan);
    }

    pub(crate) fn orphans(&self) -> Vec<OrphanedAnchor> {
        self.orphans.read().clone()
    }
}
