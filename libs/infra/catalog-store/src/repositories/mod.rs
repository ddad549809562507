// [libs/infra/catalog-store/src/repositories/mod.rs]
pub mod benchmark;
pub mod chat_history;
pub mod endpoint;
pub mod metadata;
pub mod model;
pub mod verification_history;
pub mod verified_endpoint;
