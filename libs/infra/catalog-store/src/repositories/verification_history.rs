// [libs/infra/catalog-store/src/repositories/verification_history.rs]
use chrono::{DateTime, Utc};
use prospector_catalog_models::{EndpointVerification, ResponseMetrics};
use sqlx::{Postgres, Transaction};

use crate::errors::StoreError;

/// Appends one immutable history row (spec §3: "Never updated";
/// `(endpoint_id, verification_date)` unique).
pub async fn append(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
    verification_date: DateTime<Utc>,
    response_sample: &str,
    detected_models: &serde_json::Value,
    is_honeypot: bool,
    metrics: &ResponseMetrics,
) -> Result<(), StoreError> {
    let capped_sample = EndpointVerification::cap_sample(response_sample);
    let metrics_json = serde_json::to_value(metrics).unwrap_or(serde_json::Value::Null);

    sqlx::query(
        "INSERT INTO endpoint_verifications
            (endpoint_id, verification_date, response_sample, detected_models, is_honeypot, response_metrics)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(endpoint_id)
    .bind(verification_date)
    .bind(capped_sample)
    .bind(detected_models)
    .bind(is_honeypot)
    .bind(metrics_json)
    .execute(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("append verification history", e))?;
    Ok(())
}

pub async fn recent_for_endpoint(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
    limit: i64,
) -> Result<Vec<EndpointVerification>, StoreError> {
    use sqlx::Row;

    let rows = sqlx::query(
        "SELECT * FROM endpoint_verifications WHERE endpoint_id = $1 ORDER BY verification_date DESC LIMIT $2",
    )
    .bind(endpoint_id)
    .bind(limit)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("recent_for_endpoint", e))?;

    rows.iter()
        .map(|row| {
            let metrics_json: serde_json::Value = row.try_get("response_metrics").unwrap_or(serde_json::Value::Null);
            let metrics: ResponseMetrics = serde_json::from_value(metrics_json).unwrap_or_default();
            Ok(EndpointVerification {
                id: row.try_get("id").map_err(|e| StoreError::from_sqlx("id", e))?,
                endpoint_id: row.try_get("endpoint_id").map_err(|e| StoreError::from_sqlx("endpoint_id", e))?,
                verification_date: row.try_get("verification_date").map_err(|e| StoreError::from_sqlx("verification_date", e))?,
                response_sample: row.try_get("response_sample").unwrap_or_default(),
                detected_models: row.try_get("detected_models").unwrap_or(serde_json::Value::Null),
                is_honeypot: row.try_get("is_honeypot").unwrap_or(false),
                response_metrics: metrics,
            })
        })
        .collect()
}
