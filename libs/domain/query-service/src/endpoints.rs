// [libs/domain/query-service/src/endpoints.rs]
use prospector_catalog_models::Endpoint;
use prospector_catalog_store::repositories::endpoint::{list_filtered, EndpointFilter};
use prospector_catalog_store::CatalogStore;

use crate::errors::QueryServiceError;

pub async fn list_endpoints(store: &CatalogStore, filter: EndpointFilter) -> Result<Vec<Endpoint>, QueryServiceError> {
    let endpoints = store.transaction(|tx| Box::pin(async move { list_filtered(tx, &filter).await })).await?;
    Ok(endpoints)
}
