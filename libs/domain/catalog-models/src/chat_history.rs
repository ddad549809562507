// [libs/domain/catalog-models/src/chat_history.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of a user-initiated inference request routed by
/// Dispatch. `model_id` references an extant `Model` at insertion time;
/// later model deletions are permitted (FK is not cascading on delete).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatHistory {
    pub id: i64,
    pub user_id: String,
    pub model_id: i64,
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub response: String,
    pub temperature: f64,
    pub max_tokens: i32,
    pub timestamp: DateTime<Utc>,
    pub eval_count: Option<i64>,
    pub eval_duration_ns: Option<i64>,
}
