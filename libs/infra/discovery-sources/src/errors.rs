// [libs/infra/discovery-sources/src/errors.rs]
use thiserror::Error;

/// One source's failure is isolated (spec §4.5): the pipeline always sees
/// this as "this query produced nothing", never a process-fatal error.
#[derive(Error, Debug)]
pub enum DiscoverySourceError {
    #[error("[DISCOVERY_TRANSPORT]: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("[DISCOVERY_RATE_LIMITED]: retried {attempts} times, still rate-limited")]
    RateLimited { attempts: u32 },

    #[error("[DISCOVERY_IO]: {0}")]
    Io(#[from] std::io::Error),

    #[error("[DISCOVERY_PROTOCOL]: {0}")]
    Protocol(String),
}
