// [libs/domain/catalog-models/src/model.rs]
use serde::{Deserialize, Serialize};

/// A named generative model hosted by an endpoint. `(endpoint_id, name)` is
/// unique; the store's reconciliation step keeps this set in sync with the
/// endpoint's latest `/api/tags` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: i64,
    pub endpoint_id: i64,
    pub name: String,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
    pub size_mb: Option<f64>,
    pub model_type: Option<String>,
    pub capabilities: Option<String>,
}

/// A model as observed by a single probe, before it has an `id` or
/// `endpoint_id` assigned. Produced by the probe client's tag parser,
/// consumed by the verifier's reconciliation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedModel {
    pub name: String,
    pub parameter_size: Option<String>,
    pub quantization_level: Option<String>,
    pub size_mb: Option<f64>,
}

impl ObservedModel {
    /// Size tolerance used when deciding whether a stored `Model` row needs
    /// updating (spec §4.4): a 0.1 MB drift is not a change.
    pub const SIZE_TOLERANCE_MB: f64 = 0.1;

    /// Whether `stored` already matches this observation closely enough
    /// that no update is required.
    pub fn matches(&self, stored: &Model) -> bool {
        self.parameter_size == stored.parameter_size
            && self.quantization_level == stored.quantization_level
            && match (self.size_mb, stored.size_mb) {
                (Some(a), Some(b)) => (a - b).abs() <= Self::SIZE_TOLERANCE_MB,
                (None, None) => true,
                _ => false,
            }
    }
}
