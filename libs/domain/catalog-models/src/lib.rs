// [libs/domain/catalog-models/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CATALOG DATA MODEL
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L5)
 * RESPONSABILIDAD: TIPOS DE VALOR COMPARTIDOS DEL CATALOGO
 *
 * One relational store, one DAG: Endpoint owns its Models and at most
 * one VerifiedEndpoint. Nothing here talks to a database; these are
 * plain value types shared by the store, the verifier and the query
 * service.
 * =================================================================
 */

pub mod benchmark;
pub mod capability;
pub mod chat_history;
pub mod endpoint;
pub mod metadata;
pub mod model;
pub mod probe;
pub mod verification;
pub mod verified_endpoint;

pub use benchmark::BenchmarkResult;
pub use capability::Capability;
pub use chat_history::ChatHistory;
pub use endpoint::{ApiType, Endpoint, VerificationStatus};
pub use metadata::MetadataEntry;
pub use model::{Model, ObservedModel};
pub use probe::{ProbeError, ProbeResult, ProbeStep};
pub use verification::{EndpointVerification, ResponseMetrics};
pub use verified_endpoint::VerifiedEndpoint;
