// [libs/domain/verifier/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("[VERIFIER_STORE]: {0}")]
    Store(#[from] prospector_catalog_store::StoreError),
}
