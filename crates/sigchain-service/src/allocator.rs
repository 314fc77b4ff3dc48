//! # Identifier Allocation
//!
//! Produces the next certificate identifier. The store owns the
//! serialized sequence primitive (mutex counter in memory mode, a
//! single-statement atomic increment in Postgres mode); this type turns
//! the raw sequence value into a formatted [`CertificateId`].
//!
//! Two concurrent callers never observe the same value — that guarantee
//! lives in the store's primitive, not here, by design.

use sigchain_core::CertificateId;
use sigchain_store::{CertificateStore, StoreError};

/// Allocates strictly increasing, collision-free certificate
/// identifiers.
#[derive(Debug, Clone)]
pub struct IdentifierAllocator {
    store: CertificateStore,
}

impl IdentifierAllocator {
    /// Build an allocator over the given store.
    pub fn new(store: CertificateStore) -> Self {
        Self { store }
    }

    /// Allocate the next identifier.
    ///
    /// Values exceeding the minimum width simply widen — the sequence
    /// never wraps or truncates.
    pub async fn next(&self) -> Result<CertificateId, StoreError> {
        let value = self.store.allocate_next().await?;
        Ok(CertificateId::from_number(value))
    }
}
