// [libs/domain/query-service/src/detail.rs]
use chrono::{DateTime, Utc};
use prospector_catalog_models::{BenchmarkResult, Endpoint, EndpointVerification};
use prospector_catalog_store::repositories::{benchmark, endpoint, model, verification_history};
use prospector_catalog_store::CatalogStore;

use crate::errors::QueryServiceError;

const RECENT_HISTORY_LIMIT: i64 = 10;

#[derive(Debug, Clone)]
pub struct EndpointDetail {
    pub endpoint: Endpoint,
    pub model_count: i64,
    pub latest_benchmark: Option<BenchmarkResult>,
    pub recent_history: Vec<EndpointVerification>,
    pub verified_since: Option<DateTime<Utc>>,
}

/// Joined projection for one endpoint: verified status, model count,
/// latest benchmark, last-N history entries (spec §4.8).
pub async fn endpoint_detail(store: &CatalogStore, endpoint_id: i64) -> Result<Option<EndpointDetail>, QueryServiceError> {
    let detail = store
        .transaction(|tx| {
            Box::pin(async move {
                let Some(found) = endpoint::find_by_id(tx, endpoint_id).await? else { return Ok(None) };

                let models = model::list_for_endpoint(tx, endpoint_id).await?;
                let latest_benchmark = benchmark::latest_for_endpoint(tx, endpoint_id).await?;
                let recent_history = verification_history::recent_for_endpoint(tx, endpoint_id, RECENT_HISTORY_LIMIT).await?;
                let verified_since = found.verification_date;

                Ok(Some(EndpointDetail {
                    endpoint: found,
                    model_count: models.len() as i64,
                    latest_benchmark,
                    recent_history,
                    verified_since,
                }))
            })
        })
        .await?;

    Ok(detail)
}
