// [libs/domain/catalog-models/src/verified_endpoint.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A marker that an endpoint is currently considered usable. Exactly zero
/// or one row exists per endpoint (`endpoint_id` is unique); presence iff
/// the endpoint's latest probe was Valid and it is not a honeypot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedEndpoint {
    pub id: i64,
    pub endpoint_id: i64,
    pub verification_date: DateTime<Utc>,
    pub verification_method: Option<String>,
    pub verified_by: Option<String>,
}
