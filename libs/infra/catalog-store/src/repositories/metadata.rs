// [libs/infra/catalog-store/src/repositories/metadata.rs]
use sqlx::PgPool;

use crate::errors::StoreError;

/// Upsert-by-key (spec §3: "Metadata... Upsert-by-key").
pub async fn set(pool: &PgPool, key: &str, value: &str) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO metadata (key, value, updated_at) VALUES ($1, $2, now())
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_sqlx("metadata set", e))?;
    Ok(())
}

pub async fn get(pool: &PgPool, key: &str) -> Result<Option<String>, StoreError> {
    use sqlx::Row;

    let row = sqlx::query("SELECT value FROM metadata WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::from_sqlx("metadata get", e))?;
    Ok(row.map(|r| r.try_get("value").unwrap_or_default()))
}
