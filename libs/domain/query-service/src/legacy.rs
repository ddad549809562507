// [libs/domain/query-service/src/legacy.rs]
/*!
 * Back-compat projection over the `servers` view (§9 open question,
 * resolved by the store's schema bootstrap — see DESIGN.md). Exists only
 * so callers still expecting the original two-schema shape have a landing
 * spot; no new code should be written against this type.
 */

use chrono::{DateTime, Utc};
use prospector_catalog_store::CatalogStore;
use serde::Serialize;
use sqlx::Row;

use crate::errors::QueryServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct LegacyServerRow {
    pub id: i64,
    pub ip: String,
    pub port: i32,
    pub api_type: String,
    pub api_version: Option<String>,
    pub is_active: bool,
    pub verification_date: Option<DateTime<Utc>>,
    pub verification_method: Option<String>,
}

pub async fn list_servers_legacy(store: &CatalogStore) -> Result<Vec<LegacyServerRow>, QueryServiceError> {
    let rows = store.fetch_all("SELECT * FROM servers ORDER BY id", &[]).await?;
    rows.iter()
        .map(|row| {
            Ok(LegacyServerRow {
                id: row.try_get("id").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("id", e))?,
                ip: row.try_get("ip").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("ip", e))?,
                port: row.try_get("port").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("port", e))?,
                api_type: row.try_get("api_type").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("api_type", e))?,
                api_version: row.try_get("api_version").ok(),
                is_active: row.try_get("is_active").unwrap_or(true),
                verification_date: row.try_get("verification_date").ok(),
                verification_method: row.try_get("verification_method").ok(),
            })
        })
        .collect::<Result<Vec<_>, prospector_catalog_store::StoreError>>()
        .map_err(QueryServiceError::from)
}
