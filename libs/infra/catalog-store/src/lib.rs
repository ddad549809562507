// [libs/infra/catalog-store/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CATALOG STORE
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ESTADO RELACIONAL PERSISTENTE DEL CATALOGO
 *
 * Endpoints own their Models and at most one VerifiedEndpoint — a strict
 * DAG, no cycles. Every write that touches more than one table runs
 * inside `CatalogStore::transaction`.
 * =================================================================
 */

pub mod client;
pub mod config;
pub mod errors;
pub mod repositories;
pub mod schema;
pub mod sql_value;

pub use client::CatalogStore;
pub use config::DbConfig;
pub use errors::StoreError;
pub use sql_value::SqlValue;
