// [libs/infra/catalog-store/src/repositories/endpoint.rs]
use chrono::{DateTime, Utc};
use prospector_catalog_models::capability::{capabilities_from_column, capabilities_to_column};
use prospector_catalog_models::{ApiType, Capability, Endpoint, VerificationStatus};
use sqlx::{Postgres, Row, Transaction};

use crate::errors::StoreError;

fn from_row(row: &sqlx::postgres::PgRow) -> Result<Endpoint, StoreError> {
    Ok(Endpoint {
        id: row.try_get("id").map_err(|e| StoreError::from_sqlx("endpoints.id", e))?,
        ip: row.try_get("ip").map_err(|e| StoreError::from_sqlx("endpoints.ip", e))?,
        port: row.try_get("port").map_err(|e| StoreError::from_sqlx("endpoints.port", e))?,
        api_type: ApiType::parse(&row.try_get::<String, _>("api_type").unwrap_or_default()),
        api_version: row.try_get("api_version").ok(),
        capabilities: capabilities_from_column(&row.try_get::<String, _>("capabilities").unwrap_or_default()),
        auth_required: row.try_get("auth_required").unwrap_or(false),
        scan_date: row.try_get("scan_date").map_err(|e| StoreError::from_sqlx("endpoints.scan_date", e))?,
        last_check_date: row.try_get("last_check_date").map_err(|e| StoreError::from_sqlx("endpoints.last_check_date", e))?,
        verification_date: row.try_get("verification_date").ok(),
        verified: VerificationStatus::from_i16(row.try_get::<i16, _>("verified").unwrap_or(0)),
        is_active: row.try_get("is_active").unwrap_or(true),
        inactive_reason: row.try_get("inactive_reason").ok(),
        is_honeypot: row.try_get("is_honeypot").unwrap_or(false),
        honeypot_reason: row.try_get("honeypot_reason").ok(),
        added_by: row.try_get("added_by").ok(),
        description: row.try_get("description").ok(),
    })
}

pub async fn find_by_ip_port(
    tx: &mut Transaction<'_, Postgres>,
    ip: &str,
    port: i32,
) -> Result<Option<Endpoint>, StoreError> {
    let row = sqlx::query("SELECT * FROM endpoints WHERE ip = $1 AND port = $2")
        .bind(ip)
        .bind(port)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StoreError::from_sqlx("find_by_ip_port", e))?;
    row.as_ref().map(from_row).transpose()
}

pub async fn find_by_id(tx: &mut Transaction<'_, Postgres>, id: i64) -> Result<Option<Endpoint>, StoreError> {
    let row = sqlx::query("SELECT * FROM endpoints WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StoreError::from_sqlx("find_by_id", e))?;
    row.as_ref().map(from_row).transpose()
}

/// Upserts the discovery-time row: insert if new, or refresh `scan_date`
/// (and `verified` unless `preserve_verified`) if it already exists.
/// Spec §4.4 step 2.
pub async fn upsert_on_discovery(
    tx: &mut Transaction<'_, Postgres>,
    ip: &str,
    port: i32,
    scan_verified: VerificationStatus,
    preserve_verified: bool,
    now: DateTime<Utc>,
) -> Result<Endpoint, StoreError> {
    let existing = find_by_ip_port(tx, ip, port).await?;

    match existing {
        None => {
            let row = sqlx::query(
                "INSERT INTO endpoints (ip, port, scan_date, last_check_date, verified)
                 VALUES ($1, $2, $3, $3, $4) RETURNING *",
            )
            .bind(ip)
            .bind(port)
            .bind(now)
            .bind(scan_verified as i16)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| StoreError::from_sqlx("insert endpoint", e))?;
            from_row(&row)
        }
        Some(endpoint) => {
            if preserve_verified {
                let row = sqlx::query(
                    "UPDATE endpoints SET scan_date = $1, last_check_date = $1 WHERE id = $2 RETURNING *",
                )
                .bind(now)
                .bind(endpoint.id)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| StoreError::from_sqlx("preserve-verified update", e))?;
                from_row(&row)
            } else {
                let row = sqlx::query(
                    "UPDATE endpoints SET scan_date = $1, last_check_date = $1, verified = $2 WHERE id = $3 RETURNING *",
                )
                .bind(now)
                .bind(scan_verified as i16)
                .bind(endpoint.id)
                .fetch_one(&mut **tx)
                .await
                .map_err(|e| StoreError::from_sqlx("discovery update", e))?;
                from_row(&row)
            }
        }
    }
}

/// Branch "Valid" (spec §4.4 step 5): marks the endpoint verified, clears
/// any inactive reason, records api metadata observed by the probe.
#[allow(clippy::too_many_arguments)]
pub async fn mark_valid(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
    api_type: ApiType,
    api_version: Option<&str>,
    capabilities: &[Capability],
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE endpoints SET
            verified = $1, verification_date = $2, last_check_date = $2,
            inactive_reason = NULL, is_active = TRUE,
            is_honeypot = FALSE, honeypot_reason = NULL,
            api_type = $3, api_version = COALESCE($4, api_version),
            capabilities = $5
         WHERE id = $6",
    )
    .bind(VerificationStatus::Verified as i16)
    .bind(now)
    .bind(api_type.as_str())
    .bind(api_version)
    .bind(capabilities_to_column(capabilities))
    .bind(endpoint_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("mark_valid", e))?;
    Ok(())
}

/// Branch "Honeypot(reason)" (spec §4.4 step 5).
pub async fn mark_honeypot(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE endpoints SET
            is_honeypot = TRUE, honeypot_reason = $1,
            verified = $2, last_check_date = $3
         WHERE id = $4",
    )
    .bind(reason)
    .bind(VerificationStatus::Rejected as i16)
    .bind(now)
    .bind(endpoint_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("mark_honeypot", e))?;
    Ok(())
}

/// Branch "Invalid(reason)" (spec §4.4 step 5).
pub async fn mark_invalid(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
    reason: &str,
    auth_required: bool,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    sqlx::query(
        "UPDATE endpoints SET
            verified = $1, is_active = FALSE, inactive_reason = $2,
            auth_required = auth_required OR $3, last_check_date = $4
         WHERE id = $5",
    )
    .bind(VerificationStatus::Rejected as i16)
    .bind(reason)
    .bind(auth_required)
    .bind(now)
    .bind(endpoint_id)
    .execute(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("mark_invalid", e))?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct EndpointFilter {
    pub api_type: Option<ApiType>,
    pub capability: Option<Capability>,
    pub auth_required: Option<bool>,
    pub active_only: bool,
}

pub async fn list_filtered(
    tx: &mut Transaction<'_, Postgres>,
    filter: &EndpointFilter,
) -> Result<Vec<Endpoint>, StoreError> {
    let mut sql = String::from("SELECT * FROM endpoints WHERE 1 = 1");
    if filter.api_type.is_some() {
        sql.push_str(" AND api_type = $1");
    }
    if filter.active_only {
        sql.push_str(" AND is_active = TRUE AND is_honeypot = FALSE");
    }

    let mut query = sqlx::query(&sql);
    if let Some(api_type) = filter.api_type {
        query = query.bind(api_type.as_str());
    }

    let rows = query.fetch_all(&mut **tx).await.map_err(|e| StoreError::from_sqlx("list_filtered", e))?;
    let mut endpoints: Vec<Endpoint> = rows.iter().map(from_row).collect::<Result<_, _>>()?;

    if let Some(wanted) = filter.capability {
        endpoints.retain(|e| e.capabilities.contains(&wanted));
    }
    if let Some(wanted_auth) = filter.auth_required {
        endpoints.retain(|e| e.auth_required == wanted_auth);
    }
    Ok(endpoints)
}
