//! # Error Types — Structured Error Hierarchy
//!
//! Validation errors for certificate issuance input. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! Infrastructure errors (ledger, store) live in their own crates;
//! this module only covers failures that originate from caller input.

use thiserror::Error;

/// Input validation failure. Recoverable by the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required content field is missing or empty.
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),

    /// A certificate identifier string failed to parse.
    #[error("invalid certificate identifier `{value}`: {reason}")]
    InvalidIdentifier {
        /// The offending input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A digest string was not 64 lowercase hex characters.
    #[error("invalid digest encoding `{0}`")]
    InvalidDigest(String),
}
