// [libs/infra/catalog-store/src/client.rs]
/*!
 * =================================================================
 * APARATO: CATALOG STORE CLIENT
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: POOL DE CONEXIONES Y TRANSACCIONES ACID
 * =================================================================
 */

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Executor, PgPool, Postgres, Transaction};
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::config::DbConfig;
use crate::errors::StoreError;
use crate::schema;
use crate::sql_value::{bind_arguments, SqlValue};

const ACQUIRE_BACKOFF_SECONDS: &[u64] = &[1, 2, 4];
const STATEMENT_TIMEOUT_SECONDS: u64 = 10;

/// Bounded, self-healing connection pool over a thin typed surface (spec
/// §4.1). Every multi-table write goes through `transaction`; nothing above
/// this layer opens its own connection.
#[derive(Clone)]
pub struct CatalogStore {
    pool: Arc<RwLock<PgPool>>,
    config: DbConfig,
}

impl CatalogStore {
    #[instrument(skip(config))]
    pub async fn connect(config: DbConfig) -> Result<Self, StoreError> {
        let pool = Self::build_pool(&config).await?;
        schema::apply_schema(&pool).await?;
        info!(
            "catalog store connected (min={}, max={})",
            config.min_connections, config.max_connections
        );
        Ok(Self { pool: Arc::new(RwLock::new(pool)), config })
    }

    async fn build_pool(config: &DbConfig) -> Result<PgPool, StoreError> {
        let mut last_error = None;

        for (attempt, backoff) in std::iter::once(0).chain(ACQUIRE_BACKOFF_SECONDS.iter().copied()).enumerate() {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_secs(backoff)).await;
            }

            let statement_timeout = format!("SET statement_timeout = {}", STATEMENT_TIMEOUT_SECONDS * 1000);
            let result = PgPoolOptions::new()
                .min_connections(config.min_connections)
                .max_connections(config.max_connections)
                .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
                .after_connect(move |conn, _meta| {
                    let statement_timeout = statement_timeout.clone();
                    Box::pin(async move {
                        conn.execute(statement_timeout.as_str()).await?;
                        Ok(())
                    })
                })
                .connect(&config.connection_url())
                .await;

            match result {
                Ok(pool) => return Ok(pool),
                Err(e) => {
                    warn!("pool acquisition attempt {} failed: {}", attempt + 1, e);
                    last_error = Some(e);
                }
            }
        }

        Err(StoreError::PoolExhausted { attempts: (ACQUIRE_BACKOFF_SECONDS.len() + 1) as u32, source: last_error.unwrap() })
    }

    /// Write-through execute; returns the affected-row count.
    #[instrument(skip(self, args))]
    pub async fn exec(&self, stmt: &str, args: &[SqlValue]) -> Result<u64, StoreError> {
        let pool = self.pool.read().await;
        let query = sqlx::query_with(stmt, bind_arguments(args));
        let result = query.execute(&*pool).await.map_err(|e| StoreError::from_sqlx(stmt, e))?;
        Ok(result.rows_affected())
    }

    pub async fn fetch_one(&self, stmt: &str, args: &[SqlValue]) -> Result<Option<PgRow>, StoreError> {
        let pool = self.pool.read().await;
        let query = sqlx::query_with(stmt, bind_arguments(args));
        match query.fetch_optional(&*pool).await {
            Ok(row) => Ok(row),
            Err(e) => Err(StoreError::from_sqlx(stmt, e)),
        }
    }

    pub async fn fetch_all(&self, stmt: &str, args: &[SqlValue]) -> Result<Vec<PgRow>, StoreError> {
        let pool = self.pool.read().await;
        let query = sqlx::query_with(stmt, bind_arguments(args));
        query.fetch_all(&*pool).await.map_err(|e| StoreError::from_sqlx(stmt, e))
    }

    /// Runs `f` inside one transaction: commits on `Ok`, rolls back on
    /// `Err`. Every write that touches more than one table runs through
    /// here (spec §4.1 contract).
    #[instrument(skip(self, f))]
    pub async fn transaction<F, Fut, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Transaction<'_, Postgres>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let pool = self.pool.read().await;
        let mut tx = pool.begin().await.map_err(|e| StoreError::Transaction(e.to_string()))?;

        match f(&mut tx).await {
            Ok(value) => {
                tx.commit().await.map_err(|e| StoreError::Transaction(e.to_string()))?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    error!("rollback itself failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Upsert-by-key metadata write (spec §3 Metadata).
    pub async fn set_metadata(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let pool = self.pool.read().await;
        crate::repositories::metadata::set(&pool, key, value).await
    }

    pub async fn get_metadata(&self, key: &str) -> Result<Option<String>, StoreError> {
        let pool = self.pool.read().await;
        crate::repositories::metadata::get(&pool, key).await
    }

    /// Trivial liveness check; on failure, rebuilds the pool in place and
    /// retries once. "Reinitialises the pool" is read here as constructing
    /// a fresh `PgPool` and swapping it behind the `RwLock` — `sqlx::PgPool`
    /// already manages its own internal connections, so there is no
    /// per-connection retry to perform below this layer.
    #[instrument(skip(self))]
    pub async fn keep_alive(&self) -> Result<(), StoreError> {
        {
            let pool = self.pool.read().await;
            if sqlx::query("SELECT 1").execute(&*pool).await.is_ok() {
                return Ok(());
            }
        }

        warn!("keep_alive probe failed, reinitializing pool");
        let fresh_pool = Self::build_pool(&self.config).await?;
        *self.pool.write().await = fresh_pool;

        let pool = self.pool.read().await;
        sqlx::query("SELECT 1")
            .execute(&*pool)
            .await
            .map_err(|e| StoreError::from_sqlx("SELECT 1", e))?;
        Ok(())
    }
}
