// [libs/infra/discovery-sources/src/lib.rs]
/*!
 * =================================================================
 * APARATO: DISCOVERY SOURCES
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: PRODUCTORES PEREZOSOS DE CANDIDATOS DE ESCANEO
 *
 * Each source is a function that streams `Candidate` values down an
 * `mpsc` channel rather than returning a `Vec` — the channel is this
 * crate's "lazy sequence" (spec §4.5), and it composes directly with the
 * Scan Controller's worker pool without buffering an entire search result
 * in memory. One source's failure never aborts another's.
 * =================================================================
 */

pub mod candidate;
pub mod errors;
pub mod port_scan_file;
pub mod search_api_1;
pub mod search_api_2;

pub use candidate::Candidate;
pub use errors::DiscoverySourceError;
