// [libs/infra/dispatch-service/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DISPATCH SERVICE
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: ENRUTAMIENTO DE PETICIONES INTERACTIVAS
 *
 * Resolve + Forward, the only two operations the external command
 * surface needs. Never writes to `endpoints` — that column set belongs to
 * the Verifier alone (spec §4.7).
 * =================================================================
 */

pub mod errors;
pub mod forward;
pub mod resolve;

pub use errors::DispatchError;
pub use forward::{forward, ForwardRequest, ForwardResponse};
pub use resolve::{resolve, ResolvedTarget};
