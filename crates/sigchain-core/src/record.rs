//! # Certificate Record Model
//!
//! The persisted certificate record and the issuance input types.
//!
//! A record is created once at issuance and its content fields are
//! immutable thereafter. The stored digest is a pure function of the
//! six canonical content fields; asset references, location, creation
//! timestamps, the originating network address, and the anchor
//! reference are metadata and never enter the hash input. The record
//! may be hard-deleted by its owner; deletion does not retract the
//! ledger anchor (the ledger is append-only and outlives the record).

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalFields;
use crate::digest::CertificateDigest;
use crate::error::ValidationError;
use crate::identifier::CertificateId;

/// Optional references to binary assets attached to a certificate.
///
/// References are opaque paths or URLs — the core never inspects file
/// bytes. Asset storage is an external collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRefs {
    /// Photograph of the certified document.
    #[serde(default)]
    pub document_photo: Option<String>,
    /// Photograph of the handwritten signature.
    #[serde(default)]
    pub signature_photo: Option<String>,
    /// Photograph of the signatory.
    #[serde(default)]
    pub signatory_photo: Option<String>,
}

impl AssetRefs {
    /// Whether no asset references are attached.
    pub fn is_empty(&self) -> bool {
        self.document_photo.is_none()
            && self.signature_photo.is_none()
            && self.signatory_photo.is_none()
    }
}

/// The caller-supplied content fields of an issuance request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuanceFields {
    /// What is being certified.
    pub particulars: String,
    /// Free-text description.
    pub description: String,
    /// Name of the person signing.
    pub signatory_name: String,
    /// Expiry date, stored verbatim (enforcement is out of scope).
    pub expiry_date: String,
    /// Free-text location. Metadata — not part of the digest.
    #[serde(default)]
    pub location: Option<String>,
}

impl IssuanceFields {
    /// Check that the four required content fields are present.
    ///
    /// Runs before identifier allocation so invalid requests never
    /// consume a sequence value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("particulars", &self.particulars),
            ("description", &self.description),
            ("signatory_name", &self.signatory_name),
            ("expiry_date", &self.expiry_date),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        Ok(())
    }
}

/// A persisted certificate record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// The sequential certificate identifier.
    pub identifier: CertificateId,
    /// Verified identity of the issuer.
    pub issuer_email: String,
    /// What is being certified.
    pub particulars: String,
    /// Free-text description.
    pub description: String,
    /// Name of the person signing.
    pub signatory_name: String,
    /// Expiry date, stored verbatim.
    pub expiry_date: String,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
    /// ISO calendar date of issuance (UTC).
    pub creation_date: String,
    /// Wall-clock time of issuance (UTC, `HH:MM:SS`).
    pub creation_time: String,
    /// Originating network address, normalized (IPv4 dotted quad or
    /// `"unknown"`).
    pub network_address: String,
    /// Attached asset references.
    #[serde(default)]
    pub assets: AssetRefs,
    /// Digest of the canonical content fields, computed at issuance.
    pub digest: CertificateDigest,
    /// Ledger transaction reference, set exactly once during issuance.
    #[serde(default)]
    pub transaction_ref: Option<String>,
}

impl CertificateRecord {
    /// The canonical field set this record's digest covers.
    ///
    /// Used at verification time to recompute the digest from the
    /// stored fields and detect local tampering.
    pub fn canonical_fields(&self) -> CanonicalFields {
        CanonicalFields::new(
            self.identifier.as_str(),
            &self.issuer_email,
            &self.particulars,
            &self.description,
            &self.signatory_name,
            &self.expiry_date,
        )
    }
}

/// Normalize a raw client address to an IPv4 dotted quad or `"unknown"`.
///
/// Handles the loopback and IPv4-mapped IPv6 forms that proxies and
/// dual-stack listeners produce. Anything that is not plain IPv4 after
/// unwrapping is recorded as `"unknown"` rather than rejected — the
/// network address is forensic metadata, not signed content.
pub fn normalize_client_ip(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "unknown".to_string();
    }
    if raw == "::1" || raw == "::ffff:127.0.0.1" {
        return "127.0.0.1".to_string();
    }
    if raw.contains(':') {
        // IPv4-mapped IPv6 (::ffff:a.b.c.d) unwraps to its IPv4 part.
        if let Some(mapped) = raw.strip_prefix("::ffff:") {
            if is_ipv4(mapped) {
                return mapped.to_string();
            }
        }
        return "unknown".to_string();
    }
    if is_ipv4(raw) {
        raw.to_string()
    } else {
        "unknown".to_string()
    }
}

/// Strict dotted-quad check: four decimal octets in `0..=255`.
fn is_ipv4(s: &str) -> bool {
    let mut octets = 0;
    for part in s.split('.') {
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        match part.parse::<u16>() {
            Ok(v) if v <= 255 => octets += 1,
            _ => return false,
        }
    }
    octets == 4
}
