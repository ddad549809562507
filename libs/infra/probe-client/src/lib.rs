// [libs/infra/probe-client/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PROBE CLIENT
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: SONDEO HTTP DE UN ENDPOINT CANDIDATO
 *
 * Stateless and pure with respect to the Catalog Store: `probe()` takes an
 * (ip, port) and returns a `ProbeResult`, touching nothing but the network.
 * Each step carries its own deadline (spec §4.2); step 1's failure
 * short-circuits the whole probe before step 3 runs.
 * =================================================================
 */

pub mod errors;
pub mod model_pick;
pub mod timeouts;
pub mod wire;

use std::time::Duration;

use prospector_catalog_models::{ObservedModel, ProbeError, ProbeResult, ProbeStep, ResponseMetrics};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

pub use errors::ProbeClientError;
pub use timeouts::{adaptive_timeout, parse_param_billions};

const TAGS_TIMEOUT: Duration = Duration::from_secs(15);
const GENERATE_TIMEOUT: Duration = Duration::from_secs(30);
const SYSTEM_GENERATE_TIMEOUT: Duration = Duration::from_secs(25);
const DIAGNOSTIC_TIMEOUT: Duration = Duration::from_secs(5);

const GENERATE_PROMPT: &str = "Hello, please respond with a short greeting.";
const SYSTEM_CONSTRAINT_PROMPT: &str = "Answer in no more than 20 words.";
const PROBE_MAX_TOKENS: u32 = 50;

const RETRYABLE_STEP_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_secs(3);

pub struct ProbeClient {
    http: Client,
}

impl Default for ProbeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeClient {
    pub fn new() -> Self {
        Self {
            http: Client::builder()
                .user_agent("prospector-probe-client/1.0")
                .build()
                .expect("reqwest client construction never fails with default TLS config"),
        }
    }

    /// Runs the full probe sequence against one candidate. Never returns an
    /// `Err` for a remote failure — those are captured in `ProbeResult.error`
    /// so the verifier can branch without a `Result` for the common case.
    /// A `Result::Err` here means something went wrong constructing the
    /// request itself, not talking to the remote.
    #[instrument(skip(self), fields(%ip, %port))]
    pub async fn probe(&self, ip: &str, port: u16) -> ProbeResult {
        let base_url = format!("http://{ip}:{port}");

        let tags = match self.fetch_tags(&base_url).await {
            Ok(tags) => tags,
            Err(error) => return ProbeResult { error: Some(error), ..Default::default() },
        };

        let picked = model_pick::pick_smallest(&tags.models);
        let model_name = picked.map(|m| m.name.clone()).unwrap_or_default();

        let (generate_response, generate_metrics) = match self
            .generate(&base_url, &model_name, GENERATE_PROMPT, None, GENERATE_TIMEOUT, ProbeStep::Generate, true)
            .await
        {
            Ok((text, metrics)) => (Some(text), Some(metrics)),
            Err(error) => {
                return ProbeResult {
                    tags_models: tags.models.iter().map(observed_from_wire).collect(),
                    error: Some(error),
                    ..Default::default()
                }
            }
        };

        // Step 4 is corroborative only: its own failure does not fail the
        // whole probe, it just leaves `system_generate_response` empty,
        // which the classifier's rule 5 treats as "no evidence".
        let system_generate_response = match self
            .generate(
                &base_url,
                &model_name,
                GENERATE_PROMPT,
                Some(SYSTEM_CONSTRAINT_PROMPT),
                SYSTEM_GENERATE_TIMEOUT,
                ProbeStep::SystemGenerate,
                false,
            )
            .await
        {
            Ok((text, _)) => Some(text),
            Err(error) => {
                debug!("system-prompt corroboration probe failed (non-fatal): {}", error.display_reason());
                None
            }
        };

        let version = self.fetch_version(&base_url).await;
        let process_list = self.fetch_process_list(&base_url).await;

        ProbeResult {
            tags_models: tags.models.iter().map(observed_from_wire).collect(),
            tags_raw: serde_json::to_value(&tags.models).ok(),
            generate_response,
            generate_metrics,
            system_generate_response,
            version,
            process_list,
            error: None,
        }
    }

    #[instrument(skip(self))]
    async fn fetch_tags(&self, base_url: &str) -> Result<wire::TagsResponse, ProbeError> {
        let url = format!("{base_url}/api/tags");
        let response = self.get_with_retry(&url, TAGS_TIMEOUT, ProbeStep::Tags).await?;

        response
            .json::<wire::TagsResponse>()
            .await
            .map_err(|e| ProbeError::new(ProbeStep::Tags, format!("unparseable JSON body: {e}")))
    }

    async fn fetch_version(&self, base_url: &str) -> Option<String> {
        let url = format!("{base_url}/api/version");
        let response = self.http.get(&url).timeout(DIAGNOSTIC_TIMEOUT).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<wire::VersionResponse>().await.ok().map(|v| v.version)
    }

    async fn fetch_process_list(&self, base_url: &str) -> Option<serde_json::Value> {
        let url = format!("{base_url}/api/ps");
        let response = self.http.get(&url).timeout(DIAGNOSTIC_TIMEOUT).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<serde_json::Value>().await.ok()
    }

    /// Runs one `/api/generate` call. `retryable` gates whether this step
    /// gets the linear-backoff retry treatment (true for step 3, false for
    /// the corroborative step 4, which spec §4.2 does not list as retried).
    #[allow(clippy::too_many_arguments)]
    async fn generate(
        &self,
        base_url: &str,
        model: &str,
        prompt: &str,
        system: Option<&str>,
        timeout: Duration,
        step: ProbeStep,
        retryable: bool,
    ) -> Result<(String, ResponseMetrics), ProbeError> {
        let url = format!("{base_url}/api/generate");
        let mut body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "max_tokens": PROBE_MAX_TOKENS,
        });
        if let Some(system_prompt) = system {
            body["system"] = serde_json::Value::String(system_prompt.to_string());
        }

        let attempts = if retryable { RETRYABLE_STEP_ATTEMPTS } else { 1 };
        let mut last_transport_error: Option<String> = None;

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }

            let send_result = self.http.post(&url).json(&body).timeout(timeout).send().await;
            match send_result {
                Ok(response) => {
                    if response.status() == StatusCode::UNAUTHORIZED || response.status() == StatusCode::FORBIDDEN {
                        return Err(ProbeError::auth_required(step));
                    }
                    if !response.status().is_success() {
                        // HTTP 4xx/5xx are never retried.
                        return Err(ProbeError::new(step, format!("HTTP {}", response.status())));
                    }

                    let parsed = response
                        .json::<wire::GenerateResponse>()
                        .await
                        .map_err(|e| ProbeError::new(step, format!("unparseable JSON body: {e}")))?;

                    let metrics = ResponseMetrics {
                        eval_count: parsed.eval_count,
                        eval_duration_ns: parsed.eval_duration,
                        tokens_per_second: None,
                        first_token_latency_ms: None,
                    };
                    return Ok((parsed.response, metrics));
                }
                Err(transport_error) => {
                    warn!("generate attempt {} transport failure: {}", attempt + 1, transport_error);
                    last_transport_error = Some(transport_error.to_string());
                }
            }
        }

        Err(ProbeError::new(step, last_transport_error.unwrap_or_else(|| "transport failure".into())))
    }

    /// GET with the retry policy steps 1 and 3 share: up to
    /// `RETRYABLE_STEP_ATTEMPTS` tries with linear 3s backoff, transport
    /// errors only.
    async fn get_with_retry(&self, url: &str, timeout: Duration, step: ProbeStep) -> Result<reqwest::Response, ProbeError> {
        let mut last_transport_error: Option<String> = None;

        for attempt in 0..RETRYABLE_STEP_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(RETRY_BACKOFF * attempt).await;
            }

            match self.http.get(url).timeout(timeout).send().await {
                Ok(response) => {
                    if response.status() == StatusCode::UNAUTHORIZED || response.status() == StatusCode::FORBIDDEN {
                        return Err(ProbeError::auth_required(step));
                    }
                    if !response.status().is_success() {
                        return Err(ProbeError::new(step, format!("HTTP {}", response.status())));
                    }
                    return Ok(response);
                }
                Err(transport_error) => {
                    warn!("{:?} attempt {} transport failure: {}", step, attempt + 1, transport_error);
                    last_transport_error = Some(transport_error.to_string());
                }
            }
        }

        Err(ProbeError::new(step, last_transport_error.unwrap_or_else(|| "transport failure".into())))
    }

    /// LiteLLM-flavored fallback model enumeration (spec §6): tried by the
    /// caller only after the Ollama `/api/tags` path has already failed.
    #[instrument(skip(self))]
    pub async fn fetch_litellm_models(&self, base_url: &str) -> Option<Vec<ObservedModel>> {
        for path in ["/v1/model/info", "/v1/models"] {
            let url = format!("{base_url}{path}");
            let Ok(response) = self.http.get(&url).timeout(TAGS_TIMEOUT).send().await else { continue };
            if !response.status().is_success() {
                continue;
            }
            if let Ok(parsed) = response.json::<wire::LiteLlmModelInfoResponse>().await {
                let models: Vec<ObservedModel> = parsed
                    .data
                    .iter()
                    .filter_map(|m| m.name())
                    .map(|name| ObservedModel {
                        name: name.to_string(),
                        parameter_size: None,
                        quantization_level: None,
                        size_mb: None,
                    })
                    .collect();
                if !models.is_empty() {
                    return Some(models);
                }
            }
        }
        None
    }
}

fn observed_from_wire(model: &wire::TagModel) -> ObservedModel {
    let details = model.details.clone().unwrap_or_default();
    ObservedModel {
        name: model.name.clone(),
        parameter_size: details.parameter_size,
        quantization_level: details.quantization_level,
        size_mb: model.size.map(|bytes| bytes as f64 / 1_048_576.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::{TagModel, TagModelDetails};

    #[test]
    fn converts_bytes_to_mb() {
        let model = TagModel {
            name: "llama3".into(),
            size: Some(4_000_000_000),
            details: Some(TagModelDetails { parameter_size: Some("7B".into()), quantization_level: Some("Q4_K_M".into()) }),
        };
        let observed = observed_from_wire(&model);
        assert!((observed.size_mb.unwrap() - 3814.7).abs() < 0.5);
    }

    /// Parsing any well-formed `/api/tags` payload and mapping it to
    /// `ObservedModel` yields a set equal to the input, ignoring order and
    /// omitted optional fields.
    #[test]
    fn parsing_tags_response_round_trips_to_an_equal_observed_set() {
        let body = serde_json::json!({
            "models": [
                {
                    "name": "llama3:8b",
                    "size": 4_000_000_000i64,
                    "details": { "parameter_size": "7B", "quantization_level": "Q4_K_M" }
                },
                {
                    "name": "phi3",
                    "size": 2_000_000_000i64
                }
            ]
        });

        let parsed: wire::TagsResponse = serde_json::from_value(body).expect("well-formed tags payload parses");
        let mut observed: Vec<ObservedModel> = parsed.models.iter().map(observed_from_wire).collect();
        observed.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(observed.len(), 2);

        assert_eq!(observed[0].name, "llama3:8b");
        assert_eq!(observed[0].parameter_size.as_deref(), Some("7B"));
        assert_eq!(observed[0].quantization_level.as_deref(), Some("Q4_K_M"));
        assert!((observed[0].size_mb.unwrap() - 3814.7).abs() < 0.5);

        assert_eq!(observed[1].name, "phi3");
        assert_eq!(observed[1].parameter_size, None);
        assert_eq!(observed[1].quantization_level, None);
        assert!((observed[1].size_mb.unwrap() - 1907.3).abs() < 0.5);
    }
}
