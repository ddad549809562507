// [libs/domain/verifier/src/benchmark.rs]
/*!
 * Supplemental benchmark runner (SPEC_FULL §C), matching the historical
 * `ollama_benchmark.py` method: a fixed prompt set at three context sizes
 * plus a small concurrency sweep, appended as one `BenchmarkResult` row.
 */

use std::time::{Duration, Instant};

use chrono::Utc;
use prospector_catalog_models::BenchmarkResult;
use prospector_catalog_store::repositories::benchmark;
use prospector_catalog_store::CatalogStore;
use reqwest::Client;
use tracing::instrument;

use crate::errors::VerifierError;

const CONTEXT_SIZES: [(usize, &str); 3] = [(500, "context_500_tps"), (1000, "context_1000_tps"), (2000, "context_2000_tps")];
const CONCURRENCY_LEVELS: [u32; 3] = [1, 4, 8];
const BENCHMARK_TIMEOUT: Duration = Duration::from_secs(90);

fn filler_prompt(tokens: usize) -> String {
    "word ".repeat(tokens)
}

/// Runs the fixed benchmark method against `model` on `base_url` and
/// appends the resulting row. Never mutates the `Endpoint` row itself —
/// purely additive instrumentation (SPEC_FULL §C).
#[instrument(skip(store, http))]
pub async fn run_benchmark(
    store: &CatalogStore,
    http: &Client,
    endpoint_id: i64,
    model_id: Option<i64>,
    base_url: &str,
    model: &str,
) -> Result<i64, VerifierError> {
    let mut result = BenchmarkResult { endpoint_id, model_id, test_date: Utc::now(), ..Default::default() };

    let mut response_times = Vec::new();
    let mut tps_samples = Vec::new();

    for (tokens, field) in CONTEXT_SIZES {
        let prompt = filler_prompt(tokens);
        let started = Instant::now();
        let outcome = call_generate(http, base_url, model, &prompt).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        if let Some((eval_count, eval_duration_ns)) = outcome {
            response_times.push(elapsed_ms);
            if eval_duration_ns > 0 {
                let tps = eval_count as f64 / (eval_duration_ns as f64 / 1e9);
                tps_samples.push(tps);
                match field {
                    "context_500_tps" => result.context_500_tps = Some(tps),
                    "context_1000_tps" => result.context_1000_tps = Some(tps),
                    _ => result.context_2000_tps = Some(tps),
                }
            }
        }
    }

    if !response_times.is_empty() {
        result.avg_response_time_ms = response_times.iter().sum::<f64>() / response_times.len() as f64;
    }
    if !tps_samples.is_empty() {
        result.tokens_per_second = tps_samples.iter().sum::<f64>() / tps_samples.len() as f64;
    }

    let concurrency_outcome = run_concurrency_sweep(http, base_url, model).await;
    result.max_concurrent_requests = concurrency_outcome.0;
    result.concurrency_success_rate = concurrency_outcome.1;
    result.concurrency_avg_time_ms = concurrency_outcome.2;
    result.success_rate = if response_times.is_empty() { Some(0.0) } else { Some(1.0) };

    let id = store.transaction(|tx| Box::pin(async move { benchmark::append(tx, &result).await })).await?;
    Ok(id)
}

async fn call_generate(http: &Client, base_url: &str, model: &str, prompt: &str) -> Option<(i64, i64)> {
    let url = format!("{base_url}/api/generate");
    let body = serde_json::json!({ "model": model, "prompt": prompt, "stream": false });

    let response = http.post(&url).json(&body).timeout(BENCHMARK_TIMEOUT).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let parsed: serde_json::Value = response.json().await.ok()?;
    let eval_count = parsed.get("eval_count")?.as_i64()?;
    let eval_duration = parsed.get("eval_duration")?.as_i64()?;
    Some((eval_count, eval_duration))
}

/// Sweeps a small set of concurrency levels; reports the highest level at
/// which every in-flight request succeeded, plus its success rate and
/// average latency.
async fn run_concurrency_sweep(http: &Client, base_url: &str, model: &str) -> (Option<i32>, Option<f64>, Option<f64>) {
    let mut best_level = None;
    let mut best_success_rate = None;
    let mut best_avg_ms = None;

    for level in CONCURRENCY_LEVELS {
        let started = Instant::now();
        let futures: Vec<_> = (0..level).map(|_| call_generate(http, base_url, model, "Hello")).collect();
        let results = futures::future::join_all(futures).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let succeeded = results.iter().filter(|r| r.is_some()).count();
        let success_rate = succeeded as f64 / level as f64;

        best_level = Some(level as i32);
        best_success_rate = Some(success_rate);
        best_avg_ms = Some(elapsed_ms / level as f64);

        if success_rate < 1.0 {
            break;
        }
    }

    (best_level, best_success_rate, best_avg_ms)
}
