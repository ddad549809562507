// [libs/domain/query-service/src/lib.rs]
/*!
 * =================================================================
 * APARATO: QUERY SERVICE
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L4)
 * RESPONSABILIDAD: VISTAS AGREGADAS DE SOLO LECTURA SOBRE EL CATALOGO
 *
 * No writes anywhere in this crate. Correct under concurrent Verifier
 * mutations without needing a snapshot — a reader may observe a
 * transaction-consistent partial update, never a torn one (spec §4.8).
 * =================================================================
 */

pub mod detail;
pub mod endpoints;
pub mod errors;
pub mod health;
pub mod legacy;
pub mod models;
pub mod statistics;

pub use detail::{endpoint_detail, EndpointDetail};
pub use endpoints::list_endpoints;
pub use errors::QueryServiceError;
pub use health::{database_health, DatabaseHealth};
pub use legacy::{list_servers_legacy, LegacyServerRow};
pub use models::{list_models, ModelListFilter, ModelSortKey, ModelSummary};
pub use statistics::{statistics, CatalogStatistics};
