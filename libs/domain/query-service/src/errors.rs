// [libs/domain/query-service/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryServiceError {
    #[error("[QUERY_STORE]: {0}")]
    Store(#[from] prospector_catalog_store::StoreError),
}
