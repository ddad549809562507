// [libs/domain/catalog-models/src/verification.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timing and throughput figures captured off a single probe's generate
/// step, used both for history rows and for honeypot timing checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMetrics {
    pub eval_count: Option<i64>,
    pub eval_duration_ns: Option<i64>,
    pub tokens_per_second: Option<f64>,
    pub first_token_latency_ms: Option<f64>,
}

impl ResponseMetrics {
    /// `tps = eval_count / (eval_duration / 1e9)`, per spec §4.3 rule 3.
    /// `None` when either figure is missing or duration is zero (avoids a
    /// division producing a misleading infinity).
    pub fn tokens_per_second_computed(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration_ns) {
            (Some(count), Some(duration_ns)) if duration_ns > 0 => {
                Some(count as f64 / (duration_ns as f64 / 1e9))
            }
            _ => None,
        }
    }
}

/// Append-only history of probe outcomes, used for deception analysis
/// across time. `(endpoint_id, verification_date)` is unique; rows are
/// never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointVerification {
    pub id: i64,
    pub endpoint_id: i64,
    pub verification_date: DateTime<Utc>,
    pub response_sample: String,
    pub detected_models: serde_json::Value,
    pub is_honeypot: bool,
    pub response_metrics: ResponseMetrics,
}

impl EndpointVerification {
    /// The verifier caps the stored sample so a pathological endpoint can't
    /// bloat the history table; kept here so store and verifier agree on
    /// the limit.
    pub const RESPONSE_SAMPLE_CAP: usize = 2_000;

    pub fn cap_sample(raw: &str) -> String {
        if raw.len() <= Self::RESPONSE_SAMPLE_CAP {
            raw.to_string()
        } else {
            raw.chars().take(Self::RESPONSE_SAMPLE_CAP).collect()
        }
    }
}
