//! # sigchain-service — Issuance and Verification Coordinators
//!
//! Orchestrates the leaf services into the two protocol operations:
//!
//! - **Issuance** — allocate identifier → validate → hash → anchor →
//!   persist, with anchoring as a hard precondition for persistence.
//! - **Verification** — the three-way consistency check: record store
//!   vs. ledger vs. digest recomputed from the stored fields.
//!
//! Plus the [`allocator`] the issuance path builds on and the
//! [`facematch`] collaborator client consumed by the API layer.
//!
//! ## Crate Policy
//!
//! - Coordinators are `Clone` handles over shared state; one instance
//!   serves concurrent requests.
//! - Verification verdicts are values, never errors. Only
//!   infrastructure failures surface as `Err`.

pub mod allocator;
pub mod facematch;
pub mod issuance;
pub mod verification;

pub use allocator::IdentifierAllocator;
pub use facematch::{FaceMatchClient, FaceMatchError, FaceMatchResult};
pub use issuance::{IssuanceCoordinator, IssuanceError, IssuanceRequest};
pub use verification::{VerificationCoordinator, VerificationError, VerificationReport, Verdict};
