// [libs/infra/catalog-store/src/config.rs]
use crate::errors::StoreError;

/// Connection parameters for the catalog's Postgres-backed pool (spec §6
/// configuration surface). Defaults mirror the historical scanner's own
/// (`db_connection_pool.py`): `min=5`, `max=50`, `timeout=30s`.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

impl DbConfig {
    /// Reads the `POSTGRES_*`/`DB_*` environment variables documented in
    /// spec §6. Fails fast with `ConfigError` rather than silently falling
    /// back for the variables that have no safe default (host/db/user).
    pub fn from_env() -> Result<Self, StoreError> {
        let database_type = std::env::var("DATABASE_TYPE").unwrap_or_else(|_| "postgres".to_string());
        if database_type != "postgres" {
            return Err(StoreError::Config(format!("unsupported DATABASE_TYPE: {database_type}")));
        }

        Ok(Self {
            database: std::env::var("POSTGRES_DB").unwrap_or_else(|_| "ollama_scanner".to_string()),
            user: std::env::var("POSTGRES_USER").unwrap_or_else(|_| "ollama".to_string()),
            password: std::env::var("POSTGRES_PASSWORD").unwrap_or_else(|_| "ollama_scanner_password".to_string()),
            host: std::env::var("POSTGRES_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("POSTGRES_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            min_connections: env_parse("DB_MIN_CONNECTIONS", 5),
            max_connections: env_parse("DB_MAX_CONNECTIONS", 50),
            connection_timeout_secs: env_parse("DB_CONNECTION_TIMEOUT", 30),
        })
    }

    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.database
        )
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}
