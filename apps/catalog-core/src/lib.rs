// [apps/catalog-core/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CATALOG CORE
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L2)
 * RESPONSABILIDAD: FACHADA DE PROCESO PARA LA SUPERFICIE DE COMANDOS
 *
 * The command surface (a Discord bot or any other front-end) links
 * against this crate and this crate alone: it never opens its own
 * database connection (spec §4.8/§6 command-surface contract). Every
 * operation here is a thin pass-through to Dispatch Service or Query
 * Service; formatting and authorization stay the front-end's job.
 * =================================================================
 */

use prospector_catalog_store::{CatalogStore, DbConfig, StoreError};
use prospector_dispatch_service::{forward, resolve, DispatchError, ForwardRequest, ForwardResponse, ResolvedTarget};
use prospector_query_service::{
    database_health, endpoint_detail, list_endpoints, list_models, list_servers_legacy, statistics, CatalogStatistics,
    DatabaseHealth, EndpointDetail, LegacyServerRow, ModelListFilter, ModelSortKey, ModelSummary, QueryServiceError,
};
use prospector_catalog_store::repositories::endpoint::EndpointFilter;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogCoreError {
    #[error("[CATALOG_CORE_STORE]: {0}")]
    Store(#[from] StoreError),
    #[error("[CATALOG_CORE_QUERY]: {0}")]
    Query(#[from] QueryServiceError),
    #[error("[CATALOG_CORE_DISPATCH]: {0}")]
    Dispatch(#[from] DispatchError),
}

/// Owns the store handle and the outbound HTTP client the command
/// surface's process shares for its entire lifetime.
pub struct CatalogCore {
    store: CatalogStore,
    http: reqwest::Client,
}

impl CatalogCore {
    pub async fn connect(db_config: DbConfig, http: reqwest::Client) -> Result<Self, CatalogCoreError> {
        let store = CatalogStore::connect(db_config).await?;
        Ok(Self { store, http })
    }

    pub async fn connect_from_env() -> Result<Self, CatalogCoreError> {
        let db_config = DbConfig::from_env()?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .expect("building the dispatch HTTP client");
        Self::connect(db_config, http).await
    }

    // --- Dispatch Service pass-throughs ---

    pub async fn resolve_model(&self, model_selector: &str) -> Result<ResolvedTarget, CatalogCoreError> {
        Ok(resolve(&self.store, model_selector).await?)
    }

    pub async fn forward_chat(&self, target: &ResolvedTarget, request: &ForwardRequest<'_>) -> Result<ForwardResponse, CatalogCoreError> {
        Ok(forward(&self.store, &self.http, target, request).await?)
    }

    // --- Query Service pass-throughs ---

    pub async fn list_endpoints(&self, filter: EndpointFilter) -> Result<Vec<prospector_catalog_models::Endpoint>, CatalogCoreError> {
        Ok(list_endpoints(&self.store, filter).await?)
    }

    pub async fn endpoint_detail(&self, endpoint_id: i64) -> Result<Option<EndpointDetail>, CatalogCoreError> {
        Ok(endpoint_detail(&self.store, endpoint_id).await?)
    }

    pub async fn list_models(&self, filter: ModelListFilter, sort_key: ModelSortKey) -> Result<Vec<ModelSummary>, CatalogCoreError> {
        Ok(list_models(&self.store, filter, sort_key).await?)
    }

    pub async fn statistics(&self) -> Result<CatalogStatistics, CatalogCoreError> {
        Ok(statistics(&self.store).await?)
    }

    pub async fn database_health(&self) -> Result<DatabaseHealth, CatalogCoreError> {
        Ok(database_health(&self.store).await?)
    }

    pub async fn list_servers_legacy(&self) -> Result<Vec<LegacyServerRow>, CatalogCoreError> {
        Ok(list_servers_legacy(&self.store).await?)
    }
}
