// [libs/infra/probe-client/src/wire.rs]
/*!
 * Wire-format DTOs for the Ollama-compatible and LiteLLM-compatible HTTP
 * surfaces (spec §6). Parsed defensively: every field beyond the bare
 * minimum is optional, because probe bodies are JSON of uncertain shape
 * coming from an untrusted remote server.
 */

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagModel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagModel {
    pub name: String,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub details: Option<TagModelDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagModelDetails {
    #[serde(default)]
    pub parameter_size: Option<String>,
    #[serde(default)]
    pub quantization_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub eval_count: Option<i64>,
    #[serde(default)]
    pub eval_duration: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub eval_count: Option<i64>,
    #[serde(default)]
    pub eval_duration: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionResponse {
    #[serde(default)]
    pub version: String,
}

/// LiteLLM-flavored `/v1/model/info` or `/v1/models` response: a 200 with a
/// `data` array containing `{model_name}` elements is treated as model
/// enumeration (spec §6).
#[derive(Debug, Clone, Deserialize)]
pub struct LiteLlmModelInfoResponse {
    #[serde(default)]
    pub data: Vec<LiteLlmModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiteLlmModelEntry {
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
}

impl LiteLlmModelEntry {
    pub fn name(&self) -> Option<&str> {
        self.model_name.as_deref().or(self.id.as_deref())
    }
}
