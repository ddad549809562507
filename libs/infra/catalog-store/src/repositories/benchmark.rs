// [libs/infra/catalog-store/src/repositories/benchmark.rs]
use prospector_catalog_models::BenchmarkResult;
use sqlx::{Postgres, Transaction};

use crate::errors::StoreError;

/// Appends a benchmark row (spec §3: "appended by benchmark runs; never
/// mutated"). Supplemental feature, SPEC_FULL §C.
pub async fn append(tx: &mut Transaction<'_, Postgres>, result: &BenchmarkResult) -> Result<i64, StoreError> {
    use sqlx::Row;

    let row = sqlx::query(
        "INSERT INTO benchmark_results
            (endpoint_id, model_id, test_date, avg_response_time_ms, tokens_per_second,
             first_token_latency_ms, throughput_tokens, throughput_time_ms,
             context_500_tps, context_1000_tps, context_2000_tps,
             max_concurrent_requests, concurrency_success_rate, concurrency_avg_time_ms, success_rate)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
         RETURNING id",
    )
    .bind(result.endpoint_id)
    .bind(result.model_id)
    .bind(result.test_date)
    .bind(result.avg_response_time_ms)
    .bind(result.tokens_per_second)
    .bind(result.first_token_latency_ms)
    .bind(result.throughput_tokens)
    .bind(result.throughput_time_ms)
    .bind(result.context_500_tps)
    .bind(result.context_1000_tps)
    .bind(result.context_2000_tps)
    .bind(result.max_concurrent_requests)
    .bind(result.concurrency_success_rate)
    .bind(result.concurrency_avg_time_ms)
    .bind(result.success_rate)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("insert benchmark_result", e))?;

    row.try_get("id").map_err(|e| StoreError::from_sqlx("benchmark_results.id", e))
}

pub async fn latest_for_endpoint(
    tx: &mut Transaction<'_, Postgres>,
    endpoint_id: i64,
) -> Result<Option<BenchmarkResult>, StoreError> {
    use sqlx::Row;

    let row = sqlx::query("SELECT * FROM benchmark_results WHERE endpoint_id = $1 ORDER BY test_date DESC LIMIT 1")
        .bind(endpoint_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| StoreError::from_sqlx("latest_for_endpoint", e))?;

    row.map(|row| -> Result<BenchmarkResult, StoreError> {
        Ok(BenchmarkResult {
            id: row.try_get("id").map_err(|e| StoreError::from_sqlx("id", e))?,
            endpoint_id: row.try_get("endpoint_id").map_err(|e| StoreError::from_sqlx("endpoint_id", e))?,
            model_id: row.try_get("model_id").ok(),
            test_date: row.try_get("test_date").map_err(|e| StoreError::from_sqlx("test_date", e))?,
            avg_response_time_ms: row.try_get("avg_response_time_ms").unwrap_or_default(),
            tokens_per_second: row.try_get("tokens_per_second").unwrap_or_default(),
            first_token_latency_ms: row.try_get("first_token_latency_ms").ok(),
            throughput_tokens: row.try_get("throughput_tokens").ok(),
            throughput_time_ms: row.try_get("throughput_time_ms").ok(),
            context_500_tps: row.try_get("context_500_tps").ok(),
            context_1000_tps: row.try_get("context_1000_tps").ok(),
            context_2000_tps: row.try_get("context_2000_tps").ok(),
            max_concurrent_requests: row.try_get("max_concurrent_requests").ok(),
            concurrency_success_rate: row.try_get("concurrency_success_rate").ok(),
            concurrency_avg_time_ms: row.try_get("concurrency_avg_time_ms").ok(),
            success_rate: row.try_get("success_rate").ok(),
        })
    })
    .transpose()
}
