//! # Certificate Identifiers
//!
//! `CertificateId` is the human-readable, strictly increasing
//! certificate number: a zero-padded decimal string with a minimum
//! width of four digits (`"0001"`). Values past `9999` simply widen —
//! the identifier never wraps or truncates.
//!
//! ## Invariants
//!
//! - Construction normalizes to the canonical zero-padded form, so two
//!   identifiers with the same numeric value are always equal.
//! - Ordering is numeric, not lexicographic: `"9999" < "10000"`.
//! - Allocation of *new* identifiers is the record store's job (it owns
//!   the serialized sequence primitive); this type only represents and
//!   formats them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minimum rendered width of a certificate identifier.
pub const MIN_WIDTH: usize = 4;

/// Longest digit string that still fits in a `u64`.
const MAX_DIGITS: usize = 19;

/// A certificate identifier: zero-padded decimal, minimum width 4.
///
/// Stored in canonical form. Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CertificateId(String);

impl CertificateId {
    /// Parse an identifier from caller input.
    ///
    /// Accepts decimal digit strings only and normalizes to the
    /// canonical zero-padded form (`"17"` becomes `"0017"`).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidIdentifier`] for empty input,
    /// non-digit characters, or values too large for a `u64`.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidIdentifier {
                value: input.to_string(),
                reason: "empty".to_string(),
            });
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidIdentifier {
                value: input.to_string(),
                reason: "contains non-digit characters".to_string(),
            });
        }
        if trimmed.len() > MAX_DIGITS {
            return Err(ValidationError::InvalidIdentifier {
                value: input.to_string(),
                reason: format!("longer than {MAX_DIGITS} digits"),
            });
        }
        let value: u64 = trimmed.parse().map_err(|_| ValidationError::InvalidIdentifier {
            value: input.to_string(),
            reason: "exceeds the representable range".to_string(),
        })?;
        Ok(Self::from_number(value))
    }

    /// Format a numeric sequence value as a canonical identifier.
    ///
    /// Zero-pads to [`MIN_WIDTH`]; wider values render at their natural
    /// width (`10000` stays `"10000"`).
    pub fn from_number(value: u64) -> Self {
        Self(format!("{value:0width$}", width = MIN_WIDTH))
    }

    /// The numeric value of this identifier.
    pub fn value(&self) -> u64 {
        // Canonical form is guaranteed parseable by construction.
        self.0.parse().unwrap_or(0)
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier that follows this one in the sequence.
    pub fn successor(&self) -> Self {
        Self::from_number(self.value() + 1)
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialOrd for CertificateId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CertificateId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

impl TryFrom<String> for CertificateId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CertificateId> for String {
    fn from(id: CertificateId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_number_zero_pads_to_four() {
        assert_eq!(CertificateId::from_number(1).as_str(), "0001");
        assert_eq!(CertificateId::from_number(42).as_str(), "0042");
        assert_eq!(CertificateId::from_number(9999).as_str(), "9999");
    }

    #[test]
    fn from_number_widens_past_four_digits() {
        assert_eq!(CertificateId::from_number(10000).as_str(), "10000");
        assert_eq!(CertificateId::from_number(123456).as_str(), "123456");
    }

    #[test]
    fn parse_normalizes_short_input() {
        assert_eq!(CertificateId::parse("17").unwrap().as_str(), "0017");
        assert_eq!(CertificateId::parse("0017").unwrap().as_str(), "0017");
    }

    #[test]
    fn parse_rejects_empty_and_non_digits() {
        assert!(CertificateId::parse("").is_err());
        assert!(CertificateId::parse("   ").is_err());
        assert!(CertificateId::parse("12a4").is_err());
        assert!(CertificateId::parse("-1").is_err());
        assert!(CertificateId::parse("0x10").is_err());
    }

    #[test]
    fn parse_rejects_overlong_input() {
        let too_long = "9".repeat(20);
        assert!(CertificateId::parse(&too_long).is_err());
    }

    #[test]
    fn equal_numeric_values_are_equal() {
        assert_eq!(
            CertificateId::parse("7").unwrap(),
            CertificateId::parse("0007").unwrap()
        );
    }

    #[test]
    fn ordering_is_numeric_not_lexicographic() {
        let small = CertificateId::from_number(9999);
        let large = CertificateId::from_number(10000);
        assert!(small < large);
    }

    #[test]
    fn successor_increments_and_widens() {
        assert_eq!(CertificateId::from_number(1).successor().as_str(), "0002");
        assert_eq!(
            CertificateId::from_number(9999).successor().as_str(),
            "10000"
        );
    }

    #[test]
    fn serde_round_trip() {
        let id = CertificateId::from_number(123);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"0123\"");
        let back: CertificateId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn serde_rejects_invalid_strings() {
        let result: Result<CertificateId, _> = serde_json::from_str("\"abc\"");
        assert!(result.is_err());
    }
}
