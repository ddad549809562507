// [libs/infra/dispatch-service/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("[DISPATCH_MODEL_NOT_FOUND]: no verified, non-honeypot endpoint hosts model {0:?}")]
    ModelNotFound(String),

    #[error("[DISPATCH_STORE]: {0}")]
    Store(#[from] prospector_catalog_store::StoreError),

    #[error("[DISPATCH_TIMEOUT]: forward to {0} timed out")]
    Timeout(String),

    #[error("[DISPATCH_TRANSPORT]: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[DISPATCH_UPSTREAM]: endpoint returned HTTP {0}")]
    UpstreamStatus(u16),
}
