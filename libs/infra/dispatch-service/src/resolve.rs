// [libs/infra/dispatch-service/src/resolve.rs]
/*!
 * Resolve operation (spec §4.7): maps a `model_selector` (a numeric model
 * id, or a substring of a model name) to a dispatchable endpoint.
 */

use prospector_catalog_store::{CatalogStore, SqlValue};
use sqlx::Row;
use tracing::instrument;

use crate::errors::DispatchError;

/// A model located on a currently-usable endpoint, ready for `forward`.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub endpoint_id: i64,
    pub ip: String,
    pub port: i32,
    pub model_id: i64,
    pub model_name: String,
}

const RESOLVE_BY_ID_SQL: &str = "
    SELECT e.id AS endpoint_id, e.ip, e.port, m.id AS model_id, m.name AS model_name
    FROM models m
    JOIN endpoints e ON e.id = m.endpoint_id
    JOIN verified_endpoints v ON v.endpoint_id = e.id
    WHERE m.id = $1 AND e.is_honeypot = FALSE AND e.is_active = TRUE
    LIMIT 1";

const RESOLVE_BY_NAME_SQL: &str = "
    SELECT e.id AS endpoint_id, e.ip, e.port, m.id AS model_id, m.name AS model_name
    FROM models m
    JOIN endpoints e ON e.id = m.endpoint_id
    JOIN verified_endpoints v ON v.endpoint_id = e.id
    WHERE m.name ILIKE $1 AND e.is_honeypot = FALSE AND e.is_active = TRUE
    ORDER BY v.verification_date DESC
    LIMIT 1";

#[instrument(skip(store))]
pub async fn resolve(store: &CatalogStore, model_selector: &str) -> Result<ResolvedTarget, DispatchError> {
    let row = if let Ok(model_id) = model_selector.parse::<i64>() {
        store.fetch_one(RESOLVE_BY_ID_SQL, &[SqlValue::Int(model_id)]).await?
    } else {
        let pattern = format!("%{model_selector}%");
        store.fetch_one(RESOLVE_BY_NAME_SQL, &[SqlValue::Text(pattern)]).await?
    };

    let row = row.ok_or_else(|| DispatchError::ModelNotFound(model_selector.to_string()))?;

    Ok(ResolvedTarget {
        endpoint_id: row.try_get("endpoint_id").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("endpoint_id", e))?,
        ip: row.try_get("ip").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("ip", e))?,
        port: row.try_get("port").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("port", e))?,
        model_id: row.try_get("model_id").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("model_id", e))?,
        model_name: row.try_get("model_name").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("model_name", e))?,
    })
}
