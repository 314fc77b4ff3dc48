//! # Ledger Entry Normalization
//!
//! The canonical shapes returned by the adapter, and the machinery that
//! normalizes the heterogeneous result shapes ledger node libraries
//! produce (positional arrays in some versions, named objects in
//! others). Nothing outside this crate ever sees a raw node response.

use serde::{Deserialize, Serialize};

use sigchain_core::Timestamp;

/// Receipt for a successfully anchored digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorReceipt {
    /// The ledger transaction reference.
    pub transaction_ref: String,
}

/// The ledger's record for one certificate identifier, in canonical
/// form. Once written, immutable — the system holds a read-only view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Certificate identifier as recorded on the ledger.
    pub identifier: String,
    /// Digest as anchored, lowercase hex. Compared verbatim against the
    /// record store's digest at verification time.
    pub digest: String,
    /// When the ledger accepted the anchor.
    pub anchored_at: Timestamp,
    /// Transaction reference, when the node reports it on reads.
    #[serde(default)]
    pub transaction_ref: Option<String>,
}

/// Timestamp as nodes report it: integer seconds or a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTimestamp {
    Seconds(u64),
    Text(String),
}

impl RawTimestamp {
    fn as_seconds(&self) -> Option<i64> {
        match self {
            Self::Seconds(s) => i64::try_from(*s).ok(),
            Self::Text(t) => t.trim().parse().ok(),
        }
    }
}

/// A `getCertificate` result as the node returns it: positional
/// `[identifier, digest, timestamp]` or a named object with optional
/// extras. `#[serde(untagged)]` tries each shape in order.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawCertificateResult {
    Positional(String, String, RawTimestamp),
    Named(RawNamedResult),
}

/// Named-object result shape. Every field is optional — node versions
/// disagree about which are present.
#[derive(Debug, Deserialize)]
pub(crate) struct RawNamedResult {
    #[serde(default, alias = "certificateNumber", alias = "certificate_number")]
    pub identifier: Option<String>,
    #[serde(default, alias = "hash")]
    pub digest: Option<String>,
    #[serde(default)]
    pub timestamp: Option<RawTimestamp>,
    #[serde(default, alias = "transactionHash", alias = "transaction_hash")]
    pub transaction_ref: Option<String>,
}

impl RawCertificateResult {
    /// Normalize into the canonical entry shape.
    ///
    /// Returns `Ok(None)` when the result denotes an absent entry (the
    /// contract returns empty strings for unknown identifiers). The
    /// `requested` identifier fills in when the node omits it.
    pub(crate) fn normalize(self, requested: &str) -> Result<Option<LedgerEntry>, String> {
        let (identifier, digest, timestamp, transaction_ref) = match self {
            Self::Positional(identifier, digest, timestamp) => {
                (Some(identifier), Some(digest), Some(timestamp), None)
            }
            Self::Named(named) => (
                named.identifier,
                named.digest,
                named.timestamp,
                named.transaction_ref,
            ),
        };

        // An empty digest is the contract's "no such entry" sentinel.
        let digest = match digest {
            Some(d) if !d.trim().is_empty() => d.trim().to_lowercase(),
            _ => return Ok(None),
        };

        let seconds = timestamp.as_ref().and_then(RawTimestamp::as_seconds).unwrap_or(0);
        let anchored_at = Timestamp::from_unix_seconds(seconds)
            .ok_or_else(|| format!("timestamp {seconds} out of range"))?;

        let identifier = match identifier {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => requested.to_string(),
        };

        Ok(Some(LedgerEntry {
            identifier,
            digest,
            anchored_at,
            transaction_ref,
        }))
    }
}
