//! # sigchain-core — Foundational Types
//!
//! Core domain types for the Sigchain certificate service: the
//! sequential certificate identifier, the canonical field encoding that
//! feeds digest computation, the SHA-256 content digest, UTC timestamps,
//! and the certificate record model.
//!
//! ## Crate Policy
//!
//! - No I/O. Everything in this crate is pure and deterministic.
//! - Digest computation only accepts [`CanonicalBytes`], which can only
//!   be produced by [`CanonicalFields`]. The encoding pipeline is the
//!   sole path to a digest, by construction.
//! - All timestamps are UTC with second-level precision.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identifier;
pub mod record;
pub mod temporal;

pub use canonical::{CanonicalBytes, CanonicalFields, ENCODING_VERSION};
pub use digest::{sha256_digest, CertificateDigest};
pub use error::ValidationError;
pub use identifier::CertificateId;
pub use record::{normalize_client_ip, AssetRefs, CertificateRecord, IssuanceFields};
pub use temporal::Timestamp;
