// [libs/infra/catalog-store/src/errors.rs]
use thiserror::Error;

/// Single `StoreError` kind carrying enough context for diagnostics (spec
/// §4.1/§7): pool exhaustion, statement failure, and config problems all
/// surface through this type so callers have one thing to match on.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("[STORE_CONFIG]: {0}")]
    Config(String),

    #[error("[STORE_POOL_EXHAUSTED]: failed to acquire a connection after {attempts} attempts: {source}")]
    PoolExhausted { attempts: u32, source: sqlx::Error },

    #[error("[STORE_QUERY]: {message} (sql=`{sql}`)")]
    Query { message: String, sql: String },

    #[error("[STORE_TRANSACTION]: {0}")]
    Transaction(String),

    #[error("[STORE_NOT_FOUND]")]
    NotFound,
}

impl StoreError {
    pub fn from_sqlx(sql: impl Into<String>, error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }
        StoreError::Query { message: error.to_string(), sql: sql.into() }
    }
}
