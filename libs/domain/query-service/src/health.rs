// [libs/domain/query-service/src/health.rs]
use prospector_catalog_store::CatalogStore;
use serde::Serialize;
use sqlx::Row;

use crate::errors::QueryServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct TableRowCount {
    pub table_name: String,
    pub row_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexScanCount {
    pub index_name: String,
    pub scans: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseHealth {
    pub row_counts: Vec<TableRowCount>,
    pub index_scans: Vec<IndexScanCount>,
    pub database_size_bytes: i64,
}

const TRACKED_TABLES: &[&str] = &[
    "endpoints",
    "verified_endpoints",
    "models",
    "endpoint_verifications",
    "benchmark_results",
    "chat_history",
    "metadata",
];

/// Operational snapshot (spec §4.8): per-table row counts, index-scan
/// counts from `pg_stat_user_indexes`, and overall database size.
pub async fn database_health(store: &CatalogStore) -> Result<DatabaseHealth, QueryServiceError> {
    let mut row_counts = Vec::with_capacity(TRACKED_TABLES.len());
    for table in TRACKED_TABLES {
        let sql = format!("SELECT COUNT(*) AS n FROM {table}");
        let row = store.fetch_one(&sql, &[]).await?;
        let row = row.ok_or(prospector_catalog_store::StoreError::NotFound)?;
        let row_count: i64 = row.try_get("n").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("n", e))?;
        row_counts.push(TableRowCount { table_name: table.to_string(), row_count });
    }

    let index_rows = store
        .fetch_all(
            "SELECT indexrelname AS index_name, idx_scan AS scans FROM pg_stat_user_indexes ORDER BY idx_scan DESC",
            &[],
        )
        .await?;
    let index_scans = index_rows
        .iter()
        .map(|row| {
            Ok(IndexScanCount {
                index_name: row.try_get("index_name").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("index_name", e))?,
                scans: row.try_get("scans").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("scans", e))?,
            })
        })
        .collect::<Result<Vec<_>, prospector_catalog_store::StoreError>>()?;

    let size_row = store.fetch_one("SELECT pg_database_size(current_database()) AS size", &[]).await?;
    let size_row = size_row.ok_or(prospector_catalog_store::StoreError::NotFound)?;
    let database_size_bytes: i64 = size_row.try_get("size").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("size", e))?;

    Ok(DatabaseHealth { row_counts, index_scans, database_size_bytes })
}
