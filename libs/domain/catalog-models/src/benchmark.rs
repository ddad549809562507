// [libs/domain/catalog-models/src/benchmark.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a structured performance test against one model on one
/// endpoint. Appended by benchmark runs; never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkResult {
    pub id: i64,
    pub endpoint_id: i64,
    pub model_id: Option<i64>,
    pub test_date: DateTime<Utc>,
    pub avg_response_time_ms: f64,
    pub tokens_per_second: f64,
    pub first_token_latency_ms: Option<f64>,
    pub throughput_tokens: Option<i64>,
    pub throughput_time_ms: Option<f64>,
    pub context_500_tps: Option<f64>,
    pub context_1000_tps: Option<f64>,
    pub context_2000_tps: Option<f64>,
    pub max_concurrent_requests: Option<i32>,
    pub concurrency_success_rate: Option<f64>,
    pub concurrency_avg_time_ms: Option<f64>,
    pub success_rate: Option<f64>,
}
