//! # Content Digest — Certificate Fingerprints
//!
//! Defines `CertificateDigest`, the fixed-length SHA-256 fingerprint of
//! a certificate's canonical content fields.
//!
//! ## Security Invariant
//!
//! A digest can only be computed from [`CanonicalBytes`], ensuring every
//! digest in the system is produced through the frozen v1 encoding
//! pipeline. This is enforced by the signature of [`sha256_digest`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::ValidationError;

/// A SHA-256 certificate digest.
///
/// Renders and serializes as 64 lowercase hex characters — the form
/// anchored on the ledger and stored alongside the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateDigest([u8; 32]);

impl CertificateDigest {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a digest from its 64-character hex rendering.
    ///
    /// Accepts uppercase input (the ledger is not guaranteed to
    /// preserve case) but always stores and renders lowercase.
    pub fn from_hex(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidDigest(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let hi = hex_val(chunk[0]);
            let lo = hex_val(chunk[1]);
            bytes[i] = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// The raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// Decode a single hex digit. Caller guarantees `b` is a hex digit.
fn hex_val(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

impl std::fmt::Display for CertificateDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for CertificateDigest {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<CertificateDigest> for String {
    fn from(digest: CertificateDigest) -> Self {
        digest.to_hex()
    }
}

/// Compute the SHA-256 digest of a canonical field encoding.
///
/// The signature accepts only `&CanonicalBytes`, not raw `&[u8]`, so no
/// code path can fingerprint bytes that did not pass through the
/// canonical encoding pipeline.
pub fn sha256_digest(data: &CanonicalBytes) -> CertificateDigest {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    CertificateDigest(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canonical::CanonicalFields;

    fn sample() -> CanonicalFields {
        CanonicalFields::new(
            "0001",
            "issuer@example.com",
            "Deed A",
            "desc",
            "J. Doe",
            "2030-01-01",
        )
    }

    #[test]
    fn digest_is_deterministic() {
        let cb = sample().canonical_bytes();
        assert_eq!(sha256_digest(&cb), sha256_digest(&cb));
    }

    #[test]
    fn digest_hex_is_64_lowercase_chars() {
        let hex = sha256_digest(&sample().canonical_bytes()).to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn any_single_field_change_changes_the_digest() {
        let base = sha256_digest(&sample().canonical_bytes());
        let mutations = [
            CanonicalFields::new("0002", "issuer@example.com", "Deed A", "desc", "J. Doe", "2030-01-01"),
            CanonicalFields::new("0001", "other@example.com", "Deed A", "desc", "J. Doe", "2030-01-01"),
            CanonicalFields::new("0001", "issuer@example.com", "Deed B", "desc", "J. Doe", "2030-01-01"),
            CanonicalFields::new("0001", "issuer@example.com", "Deed A", "desc.", "J. Doe", "2030-01-01"),
            CanonicalFields::new("0001", "issuer@example.com", "Deed A", "desc", "J. Roe", "2030-01-01"),
            CanonicalFields::new("0001", "issuer@example.com", "Deed A", "desc", "J. Doe", "2031-01-01"),
        ];
        for mutated in mutations {
            assert_ne!(
                base,
                sha256_digest(&mutated.canonical_bytes()),
                "mutation not reflected in digest: {mutated:?}"
            );
        }
    }

    #[test]
    fn hex_round_trip() {
        let digest = sha256_digest(&sample().canonical_bytes());
        let parsed = CertificateDigest::from_hex(&digest.to_hex()).unwrap();
        assert_eq!(parsed, digest);
    }

    #[test]
    fn from_hex_accepts_uppercase() {
        let digest = sha256_digest(&sample().canonical_bytes());
        let upper = digest.to_hex().to_uppercase();
        assert_eq!(CertificateDigest::from_hex(&upper).unwrap(), digest);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(CertificateDigest::from_hex("").is_err());
        assert!(CertificateDigest::from_hex("abcd").is_err());
        assert!(CertificateDigest::from_hex(&"g".repeat(64)).is_err());
        assert!(CertificateDigest::from_hex(&"a".repeat(63)).is_err());
        assert!(CertificateDigest::from_hex(&"a".repeat(65)).is_err());
    }

    #[test]
    fn serde_round_trip_as_hex_string() {
        let digest = sha256_digest(&sample().canonical_bytes());
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let back: CertificateDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
