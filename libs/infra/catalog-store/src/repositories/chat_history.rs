// [libs/infra/catalog-store/src/repositories/chat_history.rs]
use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use crate::errors::StoreError;

/// Appends one chat-history row inside its own transaction (spec §4.7:
/// "when save_history is true, append a ChatHistory row inside its own
/// transaction"). Dispatch never mutates the Endpoint row in the process.
#[allow(clippy::too_many_arguments)]
pub async fn append(
    tx: &mut Transaction<'_, Postgres>,
    user_id: &str,
    model_id: i64,
    prompt: &str,
    system_prompt: Option<&str>,
    response: &str,
    temperature: f64,
    max_tokens: i32,
    eval_count: Option<i64>,
    eval_duration_ns: Option<i64>,
    now: DateTime<Utc>,
) -> Result<i64, StoreError> {
    use sqlx::Row;

    let row = sqlx::query(
        "INSERT INTO chat_history
            (user_id, model_id, prompt, system_prompt, response, temperature, max_tokens, timestamp, eval_count, eval_duration)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING id",
    )
    .bind(user_id)
    .bind(model_id)
    .bind(prompt)
    .bind(system_prompt)
    .bind(response)
    .bind(temperature)
    .bind(max_tokens)
    .bind(now)
    .bind(eval_count)
    .bind(eval_duration_ns)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| StoreError::from_sqlx("insert chat_history", e))?;

    row.try_get("id").map_err(|e| StoreError::from_sqlx("chat_history.id", e))
}
