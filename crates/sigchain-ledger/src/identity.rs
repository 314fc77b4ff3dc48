//! # Anchoring Identity
//!
//! The Ed25519 account that signs every anchor submission. The ledger
//! node attributes writes to this identity and enforces per-account
//! transaction ordering, which is why writes through it are serialized
//! (see [`crate::rpc`]).
//!
//! In production the key comes from `SIGCHAIN_ANCHOR_KEY_HEX`. In
//! development an ephemeral key is generated and a warning is logged —
//! anchors submitted with it are attributed to a throwaway account.

use ed25519_dalek::{Signer, SigningKey};
use thiserror::Error;

/// Error loading the anchoring key from its hex encoding.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The key material contained invalid hex characters.
    #[error("anchoring key is not valid hex: {0}")]
    InvalidHex(String),
    /// The key material decoded to the wrong number of bytes.
    #[error("anchoring key must be exactly {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required key length in bytes.
        expected: usize,
        /// Decoded length in bytes.
        actual: usize,
    },
}

/// The Ed25519 anchoring account.
///
/// Custom `Debug` prints only the public address — the signing key
/// never appears in logs.
#[derive(Clone)]
pub struct AnchorIdentity {
    signing: SigningKey,
}

impl std::fmt::Debug for AnchorIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnchorIdentity")
            .field("address", &self.address())
            .finish()
    }
}

impl AnchorIdentity {
    /// Load the identity from a 64-character hex private key.
    pub fn from_hex(hex: &str) -> Result<Self, IdentityError> {
        let bytes = hex_decode(hex).map_err(IdentityError::InvalidHex)?;
        if bytes.len() != 32 {
            return Err(IdentityError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self {
            signing: SigningKey::from_bytes(&arr),
        })
    }

    /// Generate an ephemeral identity for development.
    ///
    /// Anchors signed with an ephemeral key cannot be attributed to a
    /// stable account after restart.
    pub fn generate() -> Self {
        tracing::warn!(
            "SIGCHAIN_ANCHOR_KEY_HEX not set — generating ephemeral anchoring key. \
             Anchors submitted with it are attributed to a throwaway account."
        );
        Self {
            signing: SigningKey::generate(&mut rand_core::OsRng),
        }
    }

    /// The public anchoring address: hex of the verifying key.
    pub fn address(&self) -> String {
        hex_encode(self.signing.verifying_key().as_bytes())
    }

    /// Sign an anchor submission over `(identifier, digest)`.
    ///
    /// The signed payload is `{identifier}:{digest_hex}` — both values
    /// are fixed-alphabet strings, so the separator is unambiguous.
    pub fn sign_submission(&self, identifier: &str, digest_hex: &str) -> String {
        let payload = format!("{identifier}:{digest_hex}");
        hex_encode(&self.signing.sign(payload.as_bytes()).to_bytes())
    }
}

/// Decode a hex string into bytes.
fn hex_decode(s: &str) -> Result<Vec<u8>, String> {
    let s = s.trim();
    if s.len() % 2 != 0 {
        return Err(format!("hex string has odd length: {}", s.len()));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}

/// Render bytes as lowercase hex.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    #[test]
    fn from_hex_round_trips_address() {
        let key_hex = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
        let a = AnchorIdentity::from_hex(key_hex).unwrap();
        let b = AnchorIdentity::from_hex(key_hex).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.address().len(), 64);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(AnchorIdentity::from_hex("abc").is_err());
        assert!(AnchorIdentity::from_hex(&"zz".repeat(32)).is_err());
        assert!(AnchorIdentity::from_hex(&"aa".repeat(16)).is_err());
    }

    #[test]
    fn generated_identities_are_distinct() {
        assert_ne!(
            AnchorIdentity::generate().address(),
            AnchorIdentity::generate().address()
        );
    }

    #[test]
    fn submission_signature_verifies() {
        let identity = AnchorIdentity::generate();
        let sig_hex = identity.sign_submission("0001", &"ab".repeat(32));
        let sig_bytes = hex_decode(&sig_hex).unwrap();
        let signature = Signature::from_slice(&sig_bytes).unwrap();
        let payload = format!("0001:{}", "ab".repeat(32));
        assert!(identity
            .signing
            .verifying_key()
            .verify(payload.as_bytes(), &signature)
            .is_ok());
    }

    #[test]
    fn debug_shows_address_not_key() {
        let key_hex = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
        let identity = AnchorIdentity::from_hex(key_hex).unwrap();
        let rendered = format!("{identity:?}");
        assert!(rendered.contains(&identity.address()));
        assert!(!rendered.contains(key_hex));
    }
}
