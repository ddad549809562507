// [libs/domain/catalog-models/src/metadata.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key/value journal entry for schema version and audit events
/// (`endpoint_{id}_{kind}_change`, `last_sync`, `server_count`, …).
/// Upsert-by-key; the store never appends a second row for the same key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Well-known keys the bootstrap routine and verifier write to.
pub mod keys {
    pub const SCHEMA_VERSION: &str = "schema_version";
    pub const LAST_SYNC: &str = "last_sync";
    pub const SERVER_COUNT: &str = "server_count";

    pub fn schema_update(n: u32) -> String {
        format!("schema_update_{n}")
    }

    pub fn endpoint_change(endpoint_id: i64, kind: &str) -> String {
        format!("endpoint_{endpoint_id}_{kind}_change")
    }
}
