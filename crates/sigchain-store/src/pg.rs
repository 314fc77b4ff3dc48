//! PostgreSQL persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `certificates`,
//! `certificate_sequence`, and `orphaned_anchors` tables. The schema is
//! bootstrapped at startup; identifier allocation is a single
//! `UPDATE … RETURNING` statement, never a read-then-write in
//! application code.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sigchain_core::{AssetRefs, CertificateDigest, CertificateId, CertificateRecord, Timestamp};

use crate::OrphanedAnchor;

/// Create the schema objects if they do not exist, and seed the
/// sequence row.
pub(crate) async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS certificates (
             certificate_number TEXT PRIMARY KEY,
             issuer_email TEXT NOT NULL,
             particulars TEXT NOT NULL,
             description TEXT NOT NULL,
             signatory_name TEXT NOT NULL,
             expiry_date TEXT NOT NULL,
             location TEXT,
             creation_date TEXT NOT NULL,
             creation_time TEXT NOT NULL,
             network_address TEXT NOT NULL,
             document_photo TEXT,
             signature_photo TEXT,
             signatory_photo TEXT,
             digest TEXT NOT NULL,
             transaction_ref TEXT
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS certificate_sequence (
             id INTEGER PRIMARY KEY CHECK (id = 1),
             last_value BIGINT NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "INSERT INTO certificate_sequence (id, last_value) VALUES (1, 0)
         ON CONFLICT (id) DO NOTHING",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS orphaned_anchors (
             certificate_number TEXT NOT NULL,
             digest TEXT NOT NULL,
             transaction_ref TEXT NOT NULL,
             anchored_at TIMESTAMPTZ NOT NULL,
             recorded_at TIMESTAMPTZ NOT NULL
         )",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Allocate the next identifier value.
///
/// A single-statement atomic increment — the database serializes
/// concurrent callers, so no two ever receive the same value, across
/// any number of application instances.
pub(crate) async fn allocate_next(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let (value,): (i64,) = sqlx::query_as(
        "UPDATE certificate_sequence SET last_value = last_value + 1
         WHERE id = 1 RETURNING last_value",
    )
    .fetch_one(pool)
    .await?;
    Ok(value as u64)
}

/// Advance the sequence so it never re-issues values at or below
/// `floor`. Used once at startup after hydration.
pub(crate) async fn advance_sequence(pool: &PgPool, floor: u64) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE certificate_sequence SET last_value = GREATEST(last_value, $1) WHERE id = 1")
        .bind(floor as i64)
        .execute(pool)
        .await?;
    Ok(())
}

/// Insert a certificate record.
pub(crate) async fn insert(pool: &PgPool, record: &CertificateRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO certificates (
             certificate_number, issuer_email, particulars, description,
             signatory_name, expiry_date, location, creation_date,
             creation_time, network_address, document_photo,
             signature_photo, signatory_photo, digest, transaction_ref
         ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
    )
    .bind(record.identifier.as_str())
    .bind(&record.issuer_email)
    .bind(&record.particulars)
    .bind(&record.description)
    .bind(&record.signatory_name)
    .bind(&record.expiry_date)
    .bind(&record.location)
    .bind(&record.creation_date)
    .bind(&record.creation_time)
    .bind(&record.network_address)
    .bind(&record.assets.document_photo)
    .bind(&record.assets.signature_photo)
    .bind(&record.assets.signatory_photo)
    .bind(record.digest.to_hex())
    .bind(&record.transaction_ref)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete an owner's certificate. Returns whether a row was removed.
pub(crate) async fn delete(
    pool: &PgPool,
    id: &CertificateId,
    issuer_email: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "DELETE FROM certificates WHERE certificate_number = $1 AND issuer_email = $2",
    )
    .bind(id.as_str())
    .bind(issuer_email)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Load every certificate for startup hydration.
pub(crate) async fn load_all(pool: &PgPool) -> Result<Vec<CertificateRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CertificateRow>(
        "SELECT certificate_number, issuer_email, particulars, description,
                signatory_name, expiry_date, location, creation_date,
                creation_time, network_address, document_photo,
                signature_photo, signatory_photo, digest, transaction_ref
         FROM certificates",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(CertificateRow::try_into_record).collect()
}

/// Journal an orphaned anchor.
pub(crate) async fn insert_orphan(
    pool: &PgPool,
    orphan: &OrphanedAnchor,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO orphaned_anchors (
             certificate_number, digest, transaction_ref, anchored_at, recorded_at
         ) VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(orphan.identifier.as_str())
    .bind(&orphan.digest)
    .bind(&orphan.transaction_ref)
    .bind(orphan.anchored_at.as_datetime())
    .bind(orphan.recorded_at.as_datetime())
    .execute(pool)
    .await?;
    Ok(())
}

/// Load the orphaned-anchor journal for startup hydration.
pub(crate) async fn load_orphans(pool: &PgPool) -> Result<Vec<OrphanedAnchor>, sqlx::Error> {
    let rows = sqlx::query_as::<_, OrphanRow>(
        "SELECT certificate_number, digest, transaction_ref, anchored_at, recorded_at
         FROM orphaned_anchors ORDER BY recorded_at",
    )
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(OrphanRow::try_into_orphan).collect()
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct CertificateRow {
    certificate_number: String,
    issuer_email: String,
    particulars: String,
    description: String,
    signatory_name: String,
    expiry_date: String,
    location: Option<String>,
    creation_date: String,
    creation_time: String,
    network_address: String,
    document_photo: Option<String>,
    signature_photo: Option<String>,
    signatory_photo: Option<String>,
    digest: String,
    transaction_ref: Option<String>,
}

impl CertificateRow {
    /// Convert a row into the domain record.
    ///
    /// A row whose identifier or digest fails to parse indicates data
    /// corruption; hydration fails loudly rather than silently
    /// defaulting (a defaulted digest would make every later
    /// verification report tampering).
    fn try_into_record(self) -> Result<CertificateRecord, sqlx::Error> {
        let identifier = CertificateId::parse(&self.certificate_number)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        let digest = CertificateDigest::from_hex(&self.digest)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(CertificateRecord {
            identifier,
            issuer_email: self.issuer_email,
            particulars: self.particulars,
            description: self.description,
            signatory_name: self.signatory_name,
            expiry_date: self.expiry_date,
            location: self.location,
            creation_date: self.creation_date,
            creation_time: self.creation_time,
            network_address: self.network_address,
            assets: AssetRefs {
                document_photo: self.document_photo,
                signature_photo: self.signature_photo,
                signatory_photo: self.signatory_photo,
            },
            digest,
            transaction_ref: self.transaction_ref,
        })
    }
}

/// Internal row type for the orphan journal.
#[derive(sqlx::FromRow)]
struct OrphanRow {
    certificate_number: String,
    digest: String,
    transaction_ref: String,
    anchored_at: DateTime<Utc>,
    recorded_at: DateTime<Utc>,
}

impl OrphanRow {
    fn try_into_orphan(self) -> Result<OrphanedAnchor, sqlx::Error> {
        let identifier = CertificateId::parse(&self.certificate_number)
            .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(OrphanedAnchor {
            identifier,
            digest: self.digest,
            transaction_ref: self.transaction_ref,
            anchored_at: Timestamp::from_datetime(self.anchored_at),
            recorded_at: Timestamp::from_datetime(self.recorded_at),
        })
    }
}
