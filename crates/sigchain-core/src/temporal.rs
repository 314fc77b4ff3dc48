//! # Temporal Types
//!
//! UTC-only timestamp type for the certificate service. All timestamps
//! are stored in UTC with second-level precision; local time conversion
//! is a presentation concern.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A UTC timestamp with second-level precision.
///
/// Serializes to ISO 8601 with a `Z` suffix (e.g. `2026-01-15T12:00:00Z`).
/// Subsecond precision is truncated on construction so that equal
/// timestamps always render identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// The current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Build from a `chrono::DateTime<Utc>`, truncating to seconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(
            Utc.timestamp_opt(dt.timestamp(), 0)
                .single()
                .unwrap_or(dt),
        )
    }

    /// Build from seconds since the Unix epoch (the form distributed
    /// ledgers report block times in). Returns `None` for values
    /// outside chrono's representable range.
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// ISO 8601 rendering with `Z` suffix, second precision.
    pub fn to_canonical_string(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// The ISO calendar date component (`YYYY-MM-DD`), as stored in the
    /// certificate record's creation date field.
    pub fn date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }

    /// The wall-clock time component (`HH:MM:SS`), as stored in the
    /// certificate record's creation time field.
    pub fn time_string(&self) -> String {
        self.0.format("%H:%M:%S").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}
