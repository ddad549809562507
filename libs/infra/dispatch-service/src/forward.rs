// [libs/infra/dispatch-service/src/forward.rs]
/*!
 * Forward operation (spec §4.7): a single interactive, non-streaming chat
 * call against a resolved endpoint. Fixed 60s timeout — this is not the
 * adaptive curve the Probe Client uses for hostile/unknown servers,
 * because by the time Dispatch calls an endpoint it is already verified.
 */

use std::time::Duration;

use chrono::Utc;
use prospector_catalog_store::CatalogStore;
use prospector_probe_client::wire::ChatResponse;
use reqwest::Client;
use tracing::instrument;

use crate::errors::DispatchError;
use crate::resolve::ResolvedTarget;

const FORWARD_TIMEOUT: Duration = Duration::from_secs(60);

pub struct ForwardRequest<'a> {
    pub user_id: &'a str,
    pub prompt: &'a str,
    pub system_prompt: Option<&'a str>,
    pub temperature: f64,
    pub max_tokens: i32,
    pub save_history: bool,
}

#[derive(Debug, Clone)]
pub struct ForwardResponse {
    pub content: String,
    pub eval_count: Option<i64>,
    pub eval_duration_ns: Option<i64>,
}

/// Posts one chat turn to `target` and, if requested, persists it. Never
/// touches the `endpoints` table — a failure here is the caller's problem,
/// not a verification signal (spec §4.7 contract).
#[instrument(skip(store, http, request))]
pub async fn forward(
    store: &CatalogStore,
    http: &Client,
    target: &ResolvedTarget,
    request: &ForwardRequest<'_>,
) -> Result<ForwardResponse, DispatchError> {
    let url = format!("http://{}:{}/api/chat", target.ip, target.port);

    let mut messages = Vec::new();
    if let Some(system_prompt) = request.system_prompt {
        if !system_prompt.is_empty() {
            messages.push(serde_json::json!({ "role": "system", "content": system_prompt }));
        }
    }
    messages.push(serde_json::json!({ "role": "user", "content": request.prompt }));

    let body = serde_json::json!({
        "model": target.model_name,
        "messages": messages,
        "stream": false,
        "options": {
            "temperature": request.temperature,
            "num_predict": request.max_tokens,
        },
    });

    let response = http
        .post(&url)
        .json(&body)
        .timeout(FORWARD_TIMEOUT)
        .send()
        .await
        .map_err(|e| if e.is_timeout() { DispatchError::Timeout(url.clone()) } else { DispatchError::Transport(e) })?;

    if !response.status().is_success() {
        return Err(DispatchError::UpstreamStatus(response.status().as_u16()));
    }

    let parsed: ChatResponse = response.json().await?;
    let content = parsed.message.map(|m| m.content).unwrap_or_default();

    if request.save_history {
        let now = Utc::now();
        let prompt = request.prompt.to_string();
        let system_prompt = request.system_prompt.map(str::to_string);
        let user_id = request.user_id.to_string();
        let content_for_history = content.clone();
        let model_id = target.model_id;
        let temperature = request.temperature;
        let max_tokens = request.max_tokens;
        let eval_count = parsed.eval_count;
        let eval_duration = parsed.eval_duration;

        store
            .transaction(|tx| {
                Box::pin(async move {
                    prospector_catalog_store::repositories::chat_history::append(
                        tx,
                        &user_id,
                        model_id,
                        &prompt,
                        system_prompt.as_deref(),
                        &content_for_history,
                        temperature,
                        max_tokens,
                        eval_count,
                        eval_duration,
                        now,
                    )
                    .await
                    .map(|_| ())
                })
            })
            .await?;
    }

    Ok(ForwardResponse { content, eval_count: parsed.eval_count, eval_duration_ns: parsed.eval_duration })
}
