//! # Canonical Field Encoding — Digest Input Production
//!
//! This module defines `CanonicalFields` and `CanonicalBytes`, the sole
//! construction path for the bytes that feed certificate digest
//! computation.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way
//! to construct it is through [`CanonicalFields::canonical_bytes`],
//! which applies the frozen v1 encoding. Any function that computes a
//! digest must accept `&CanonicalBytes`, so no code path can hash
//! non-canonical bytes.
//!
//! ## Encoding v1 (frozen)
//!
//! One version byte, then the six content fields in fixed order —
//! identifier, issuer email, particulars, description, signatory name,
//! expiry date — each encoded as a big-endian `u64` byte length
//! followed by the field's UTF-8 bytes.
//!
//! Length prefixing makes the encoding injective: no arrangement of
//! field values can collide with a different arrangement, which a bare
//! concatenation cannot guarantee (`"ab" + "c"` vs `"a" + "bc"`).
//!
//! Changing the field order, the field set, or the length encoding
//! silently breaks re-verification of every previously issued
//! certificate. Any such change must bump [`ENCODING_VERSION`] and keep
//! the v1 path alive for existing records.

/// Version tag prepended to every canonical encoding.
pub const ENCODING_VERSION: u8 = 1;

/// The six content fields that are signed into the digest, in frozen
/// order. Asset references, location, timestamps, the network address,
/// and the anchor reference are metadata and are excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalFields {
    identifier: String,
    issuer_email: String,
    particulars: String,
    description: String,
    signatory_name: String,
    expiry_date: String,
}

impl CanonicalFields {
    /// Assemble the canonical field set.
    ///
    /// Field values are taken verbatim — no trimming, case folding, or
    /// normalization. The digest must reproduce exactly what was
    /// issued, byte for byte.
    pub fn new(
        identifier: &str,
        issuer_email: &str,
        particulars: &str,
        description: &str,
        signatory_name: &str,
        expiry_date: &str,
    ) -> Self {
        Self {
            identifier: identifier.to_string(),
            issuer_email: issuer_email.to_string(),
            particulars: particulars.to_string(),
            description: description.to_string(),
            signatory_name: signatory_name.to_string(),
            expiry_date: expiry_date.to_string(),
        }
    }

    /// Produce the v1 canonical byte encoding of the field set.
    ///
    /// This is the ONLY constructor of [`CanonicalBytes`]. All digest
    /// computation flows through here.
    pub fn canonical_bytes(&self) -> CanonicalBytes {
        let fields = [
            &self.identifier,
            &self.issuer_email,
            &self.particulars,
            &self.description,
            &self.signatory_name,
            &self.expiry_date,
        ];
        let total: usize = fields.iter().map(|f| 8 + f.len()).sum();
        let mut out = Vec::with_capacity(1 + total);
        out.push(ENCODING_VERSION);
        for field in fields {
            out.extend_from_slice(&(field.len() as u64).to_be_bytes());
            out.extend_from_slice(field.as_bytes());
        }
        CanonicalBytes(out)
    }
}

/// Bytes produced exclusively by the v1 canonical field encoding.
///
/// The inner `Vec<u8>` is private; downstream code cannot fabricate a
/// `CanonicalBytes` from arbitrary input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty. Never true in
    /// practice — the version tag alone occupies one byte.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
