// [libs/infra/probe-client/src/errors.rs]
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeClientError {
    #[error("[PROBE_TRANSPORT]: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[PROBE_PROTOCOL]: {0}")]
    Protocol(String),
}
