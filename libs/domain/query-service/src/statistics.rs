// [libs/domain/query-service/src/statistics.rs]
use prospector_catalog_store::CatalogStore;
use serde::Serialize;
use sqlx::Row;

use crate::errors::QueryServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct ApiTypeCount {
    pub api_type: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopModel {
    pub name: String,
    pub host_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramBucket {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct CatalogStatistics {
    pub total_endpoints: i64,
    pub total_verified: i64,
    pub total_models: i64,
    pub by_api_type: Vec<ApiTypeCount>,
    pub top_models: Vec<TopModel>,
    pub parameter_size_histogram: Vec<HistogramBucket>,
    pub quantization_histogram: Vec<HistogramBucket>,
}

const TOP_MODELS_LIMIT: i64 = 10;

/// Aggregated catalog-wide figures (spec §4.8): counts by api_type,
/// totals, top hosted models, parameter-size and quantization histograms.
pub async fn statistics(store: &CatalogStore) -> Result<CatalogStatistics, QueryServiceError> {
    let total_endpoints: i64 = scalar(store, "SELECT COUNT(*) AS n FROM endpoints").await?;
    let total_verified: i64 = scalar(store, "SELECT COUNT(*) AS n FROM verified_endpoints").await?;
    let total_models: i64 = scalar(store, "SELECT COUNT(*) AS n FROM models").await?;

    let by_api_type_rows = store
        .fetch_all("SELECT api_type, COUNT(*) AS count FROM endpoints GROUP BY api_type ORDER BY count DESC", &[])
        .await?;
    let by_api_type = by_api_type_rows
        .iter()
        .map(|row| {
            Ok(ApiTypeCount {
                api_type: row.try_get("api_type").map_err(sqlx_err("api_type"))?,
                count: row.try_get("count").map_err(sqlx_err("count"))?,
            })
        })
        .collect::<Result<Vec<_>, prospector_catalog_store::StoreError>>()?;

    let top_models_rows = store
        .fetch_all(
            &format!(
                "SELECT name, COUNT(DISTINCT endpoint_id) AS host_count FROM models
                 GROUP BY name ORDER BY host_count DESC LIMIT {TOP_MODELS_LIMIT}"
            ),
            &[],
        )
        .await?;
    let top_models = top_models_rows
        .iter()
        .map(|row| {
            Ok(TopModel {
                name: row.try_get("name").map_err(sqlx_err("name"))?,
                host_count: row.try_get("host_count").map_err(sqlx_err("host_count"))?,
            })
        })
        .collect::<Result<Vec<_>, prospector_catalog_store::StoreError>>()?;

    let parameter_size_histogram = histogram(store, "parameter_size").await?;
    let quantization_histogram = histogram(store, "quantization_level").await?;

    Ok(CatalogStatistics {
        total_endpoints,
        total_verified,
        total_models,
        by_api_type,
        top_models,
        parameter_size_histogram,
        quantization_histogram,
    })
}

async fn histogram(store: &CatalogStore, column: &str) -> Result<Vec<HistogramBucket>, QueryServiceError> {
    let sql = format!(
        "SELECT {column} AS label, COUNT(*) AS count FROM models
         WHERE {column} IS NOT NULL GROUP BY {column} ORDER BY count DESC"
    );
    let rows = store.fetch_all(&sql, &[]).await?;
    rows.iter()
        .map(|row| {
            Ok(HistogramBucket {
                label: row.try_get("label").map_err(sqlx_err("label"))?,
                count: row.try_get("count").map_err(sqlx_err("count"))?,
            })
        })
        .collect::<Result<Vec<_>, prospector_catalog_store::StoreError>>()
        .map_err(QueryServiceError::from)
}

async fn scalar(store: &CatalogStore, sql: &str) -> Result<i64, QueryServiceError> {
    let row = store.fetch_one(sql, &[]).await?;
    let row = row.ok_or(prospector_catalog_store::StoreError::NotFound)?;
    Ok(row.try_get("n").map_err(sqlx_err("n"))?)
}

fn sqlx_err(field: &'static str) -> impl Fn(sqlx::Error) -> prospector_catalog_store::StoreError {
    move |e| prospector_catalog_store::StoreError::from_sqlx(field, e)
}
