// [libs/infra/catalog-store/src/schema.rs]
/*!
 * Idempotent schema bootstrap (spec §6 "Persisted state layout"). Each
 * table is `CREATE TABLE IF NOT EXISTS`; re-running against an existing
 * database is always safe. The `servers` view resolves the §9 open
 * question about the two legacy schemas — see DESIGN.md.
 */

use sqlx::{Executor, PgPool};
use tracing::{info, instrument};

use crate::errors::StoreError;

const SCHEMA_VERSION: i64 = 1;

const TABLES: &[(&str, &str)] = &[
    ("endpoints", r#"
        CREATE TABLE IF NOT EXISTS endpoints (
            id BIGSERIAL PRIMARY KEY,
            ip TEXT NOT NULL,
            port INTEGER NOT NULL,
            api_type TEXT NOT NULL DEFAULT 'unknown',
            api_version TEXT,
            capabilities TEXT NOT NULL DEFAULT '',
            auth_required BOOLEAN NOT NULL DEFAULT FALSE,
            scan_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            last_check_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            verification_date TIMESTAMPTZ,
            verified SMALLINT NOT NULL DEFAULT 0,
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            inactive_reason TEXT,
            is_honeypot BOOLEAN NOT NULL DEFAULT FALSE,
            honeypot_reason TEXT,
            added_by TEXT,
            description TEXT,
            UNIQUE (ip, port)
        );
    "#),
    ("verified_endpoints", r#"
        CREATE TABLE IF NOT EXISTS verified_endpoints (
            id BIGSERIAL PRIMARY KEY,
            endpoint_id BIGINT NOT NULL UNIQUE REFERENCES endpoints(id) ON DELETE CASCADE,
            verification_date TIMESTAMPTZ NOT NULL,
            verification_method TEXT,
            verified_by TEXT
        );
    "#),
    ("models", r#"
        CREATE TABLE IF NOT EXISTS models (
            id BIGSERIAL PRIMARY KEY,
            endpoint_id BIGINT NOT NULL REFERENCES endpoints(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            parameter_size TEXT,
            quantization_level TEXT,
            size_mb DOUBLE PRECISION,
            model_type TEXT,
            capabilities TEXT,
            UNIQUE (endpoint_id, name)
        );
    "#),
    ("endpoint_verifications", r#"
        CREATE TABLE IF NOT EXISTS endpoint_verifications (
            id BIGSERIAL PRIMARY KEY,
            endpoint_id BIGINT NOT NULL REFERENCES endpoints(id) ON DELETE CASCADE,
            verification_date TIMESTAMPTZ NOT NULL,
            response_sample TEXT NOT NULL DEFAULT '',
            detected_models JSONB NOT NULL DEFAULT '[]',
            is_honeypot BOOLEAN NOT NULL DEFAULT FALSE,
            response_metrics JSONB NOT NULL DEFAULT '{}',
            UNIQUE (endpoint_id, verification_date)
        );
    "#),
    ("benchmark_results", r#"
        CREATE TABLE IF NOT EXISTS benchmark_results (
            id BIGSERIAL PRIMARY KEY,
            endpoint_id BIGINT NOT NULL REFERENCES endpoints(id) ON DELETE CASCADE,
            model_id BIGINT REFERENCES models(id) ON DELETE SET NULL,
            test_date TIMESTAMPTZ NOT NULL DEFAULT now(),
            avg_response_time_ms DOUBLE PRECISION NOT NULL,
            tokens_per_second DOUBLE PRECISION NOT NULL,
            first_token_latency_ms DOUBLE PRECISION,
            throughput_tokens BIGINT,
            throughput_time_ms DOUBLE PRECISION,
            context_500_tps DOUBLE PRECISION,
            context_1000_tps DOUBLE PRECISION,
            context_2000_tps DOUBLE PRECISION,
            max_concurrent_requests INTEGER,
            concurrency_success_rate DOUBLE PRECISION,
            concurrency_avg_time_ms DOUBLE PRECISION,
            success_rate DOUBLE PRECISION
        );
    "#),
    ("chat_history", r#"
        CREATE TABLE IF NOT EXISTS chat_history (
            id BIGSERIAL PRIMARY KEY,
            user_id TEXT NOT NULL,
            model_id BIGINT NOT NULL REFERENCES models(id),
            prompt TEXT NOT NULL,
            system_prompt TEXT,
            response TEXT NOT NULL,
            temperature DOUBLE PRECISION NOT NULL,
            max_tokens INTEGER NOT NULL,
            timestamp TIMESTAMPTZ NOT NULL DEFAULT now(),
            eval_count BIGINT,
            eval_duration BIGINT
        );
    "#),
    ("metadata", r#"
        CREATE TABLE IF NOT EXISTS metadata (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        );
    "#),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_endpoints_active ON endpoints (is_active, verified)",
    "CREATE INDEX IF NOT EXISTS idx_models_name ON models (name)",
    "CREATE INDEX IF NOT EXISTS idx_verifications_endpoint ON endpoint_verifications (endpoint_id, verification_date DESC)",
];

/// Read-only projection resolving the §9 open question: two legacy schemas
/// ("servers" and "endpoints") coexist in the original; this collapses them
/// to one `Endpoint` table and keeps `servers` alive as a view.
const SERVERS_VIEW: &str = r#"
    CREATE OR REPLACE VIEW servers AS
    SELECT
        e.id, e.ip, e.port, e.api_type, e.api_version, e.is_active,
        v.verification_date, v.verification_method
    FROM endpoints e
    LEFT JOIN verified_endpoints v ON v.endpoint_id = e.id;
"#;

#[instrument(skip(pool))]
pub async fn apply_schema(pool: &PgPool) -> Result<(), StoreError> {
    for (name, ddl) in TABLES {
        pool.execute(*ddl).await.map_err(|e| StoreError::from_sqlx(name, e))?;
    }
    for ddl in INDEXES {
        pool.execute(*ddl).await.map_err(|e| StoreError::from_sqlx("index", e))?;
    }
    pool.execute(SERVERS_VIEW).await.map_err(|e| StoreError::from_sqlx("servers view", e))?;

    record_schema_breadcrumb(pool).await?;
    info!("catalog schema applied (version {})", SCHEMA_VERSION);
    Ok(())
}

async fn record_schema_breadcrumb(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO metadata (key, value, updated_at) VALUES ($1, $2, now())
         ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()",
    )
    .bind(prospector_catalog_models::metadata::keys::SCHEMA_VERSION)
    .bind(SCHEMA_VERSION.to_string())
    .execute(pool)
    .await
    .map_err(|e| StoreError::from_sqlx("metadata schema_version", e))?;
    Ok(())
}
