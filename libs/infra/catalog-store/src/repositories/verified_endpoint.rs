// [libs/infra/catalog-store/src/repositories/verified_endpoint.rs]
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use crate::errors::StoreError;

/// Upserts the `VerifiedEndpoint` marker for a successful probe (spec §3:
/// "inserted on first successful verification; verification_date refreshed
/// on subsequent successes").
pub async fn upsert(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
    verification_method: Option<&str>,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO verified_endpoints (endpoint_id, verification_date, verification_method)
         VALUES ($1, $2, $3)
         ON CONFLICT (endpoint_id) DO UPDATE SET
            verification_date = EXCLUDED.verification_date,
            verification_method = EXCLUDED.verification_method",
    )
    .bind(endpoint_id)
    .bind(now)
    .bind(verification_method)
    .execute(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("verified_endpoints upsert", e))?;
    Ok(())
}

/// Deletes the marker — called on Honeypot or Invalid verdicts (spec §4.4).
pub async fn delete(tx: &mut Transaction<'_, Postgres>, endpoint_id: i64) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM verified_endpoints WHERE endpoint_id = $1")
        .bind(endpoint_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| StoreError::from_sqlx("verified_endpoints delete", e))?;
    Ok(())
}
