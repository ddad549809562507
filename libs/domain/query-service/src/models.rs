// [libs/domain/query-service/src/models.rs]
use prospector_catalog_store::{CatalogStore, SqlValue};
use serde::Serialize;
use sqlx::Row;

use crate::errors::QueryServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSortKey {
    Name,
    ParameterSize,
    QuantizationLevel,
    HostCount,
}

impl ModelSortKey {
    fn column(self) -> &'static str {
        match self {
            ModelSortKey::Name => "name",
            ModelSortKey::ParameterSize => "parameter_size",
            ModelSortKey::QuantizationLevel => "quantization_level",
            ModelSortKey::HostCount => "host_count",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
    pub host_count: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ModelListFilter {
    pub name_contains: Option<String>,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
}

/// Distinct model names across the catalog, with a per-name host count
/// (spec §4.8: "count = number of endpoints hosting the name").
pub async fn list_models(
    store: &CatalogStore,
    filter: ModelListFilter,
    sort_key: ModelSortKey,
) -> Result<Vec<ModelSummary>, QueryServiceError> {
    let mut sql = String::from(
        "SELECT name, MIN(parameter_size) AS parameter_size, MIN(quantization_level) AS quantization_level,
                COUNT(DISTINCT endpoint_id) AS host_count
         FROM models WHERE 1 = 1",
    );
    let mut args = Vec::new();

    if let Some(needle) = &filter.name_contains {
        args.push(SqlValue::Text(format!("%{needle}%")));
        sql.push_str(&format!(" AND name ILIKE ${}", args.len()));
    }
    if let Some(size) = &filter.parameter_size {
        args.push(SqlValue::Text(size.clone()));
        sql.push_str(&format!(" AND parameter_size = ${}", args.len()));
    }
    if let Some(quant) = &filter.quantization_level {
        args.push(SqlValue::Text(quant.clone()));
        sql.push_str(&format!(" AND quantization_level = ${}", args.len()));
    }

    sql.push_str(" GROUP BY name");
    sql.push_str(&format!(" ORDER BY {} ASC", sort_key.column()));

    let rows = store.fetch_all(&sql, &args).await?;
    rows.iter()
        .map(|row| {
            Ok(ModelSummary {
                name: row.try_get("name").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("name", e))?,
                parameter_size: row.try_get("parameter_size").ok(),
                quantization_level: row.try_get("quantization_level").ok(),
                host_count: row.try_get("host_count").map_err(|e| prospector_catalog_store::StoreError::from_sqlx("host_count", e))?,
            })
        })
        .collect::<Result<Vec<_>, prospector_catalog_store::StoreError>>()
        .map_err(QueryServiceError::from)
}
