// [libs/infra/catalog-store/src/repositories/model.rs]
use prospector_catalog_models::{Model, ObservedModel};
use sqlx::{Postgres, Row, Transaction};

use crate::errors::StoreError;

fn from_row(row: &sqlx::postgres::PgRow) -> Result<Model, StoreError> {
    Ok(Model {
        id: row.try_get("id").map_err(|e| StoreError::from_sqlx("models.id", e))?,
        endpoint_id: row.try_get("endpoint_id").map_err(|e| StoreError::from_sqlx("models.endpoint_id", e))?,
        name: row.try_get("name").map_err(|e| StoreError::from_sqlx("models.name", e))?,
        parameter_size: row.try_get("parameter_size").ok(),
        quantization_level: row.try_get("quantization_level").ok(),
        size_mb: row.try_get("size_mb").ok(),
        model_type: row.try_get("model_type").ok(),
        capabilities: row.try_get("capabilities").ok(),
    })
}

pub async fn list_for_endpoint(tx: &mut Transaction<'_, Postgres>, endpoint_id: i64) -> Result<Vec<Model>, StoreError> {
    let rows = sqlx::query("SELECT * FROM models WHERE endpoint_id = $1")
        .bind(endpoint_id)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| StoreError::from_sqlx("list_for_endpoint", e))?;
    rows.iter().map(from_row).collect()
}

/// Diff-apply reconciliation (spec §4.4): makes the stored Model set match
/// `observed` exactly. Add missing, update drifted, delete absent — all
/// inside the caller's transaction so readers never see a partial mix.
pub async fn reconcile(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
    observed: &[ObservedModel],
) -> Result<(), StoreError> {
    let stored = list_for_endpoint(tx, endpoint_id).await?;

    for stored_model in &stored {
        if !observed.iter().any(|o| o.name == stored_model.name) {
            sqlx::query("DELETE FROM models WHERE id = $1")
                .bind(stored_model.id)
                .execute(&mut **tx)
                .await
                .map_err(|e| StoreError::from_sqlx("delete stale model", e))?;
        }
    }

    for observed_model in observed {
        match stored.iter().find(|m| m.name == observed_model.name) {
            None => {
                sqlx::query(
                    "INSERT INTO models (endpoint_id, name, parameter_size, quantization_level, size_mb)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(endpoint_id)
                .bind(&observed_model.name)
                .bind(&observed_model.parameter_size)
                .bind(&observed_model.quantization_level)
                .bind(observed_model.size_mb)
                .execute(&mut **tx)
                .await
                .map_err(|e| StoreError::from_sqlx("insert new model", e))?;
            }
            Some(existing) if !observed_model.matches(existing) => {
                sqlx::query(
                    "UPDATE models SET parameter_size = $1, quantization_level = $2, size_mb = $3 WHERE id = $4",
                )
                .bind(&observed_model.parameter_size)
                .bind(&observed_model.quantization_level)
                .bind(observed_model.size_mb)
                .bind(existing.id)
                .execute(&mut **tx)
                .await
                .map_err(|e| StoreError::from_sqlx("update drifted model", e))?;
            }
            Some(_) => {} // unchanged
        }
    }

    Ok(())
}

pub struct ModelFilter {
    pub name_contains: Option<String>,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
}

pub async fn search(tx: &mut Transaction<'_, Postgres>, filter: &ModelFilter) -> Result<Vec<Model>, StoreError> {
    let mut sql = String::from("SELECT * FROM models WHERE 1 = 1");
    if filter.name_contains.is_some() {
        sql.push_str(" AND name ILIKE $1");
    }
    let mut query = sqlx::query(&sql);
    if let Some(needle) = &filter.name_contains {
        query = query.bind(format!("%{needle}%"));
    }

    let rows = query.fetch_all(&mut **tx).await.map_err(|e| StoreError::from_sqlx("model search", e))?;
    let mut models: Vec<Model> = rows.iter().map(from_row).collect::<Result<_, _>>()?;

    if let Some(size) = &filter.parameter_size {
        models.retain(|m| m.parameter_size.as_deref() == Some(size.as_str()));
    }
    if let Some(quant) = &filter.quantization_level {
        models.retain(|m| m.quantization_level.as_deref() == Some(quant.as_str()));
    }
    Ok(models)
}
