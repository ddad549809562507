// [libs/domain/catalog-models/src/endpoint.rs]
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capability::Capability;

/// The wire flavor an endpoint speaks, as inferred from its probe responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    Ollama,
    LocalAi,
    Unknown,
}

impl ApiType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiType::Ollama => "ollama",
            ApiType::LocalAi => "localai",
            ApiType::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> ApiType {
        match raw {
            "ollama" => ApiType::Ollama,
            "localai" => ApiType::LocalAi,
            _ => ApiType::Unknown,
        }
    }
}

/// `verified` column: `0 = never probed, 1 = verified, 2 = rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i16)]
pub enum VerificationStatus {
    Never = 0,
    Verified = 1,
    Rejected = 2,
}

impl VerificationStatus {
    pub fn from_i16(raw: i16) -> VerificationStatus {
        match raw {
            1 => VerificationStatus::Verified,
            2 => VerificationStatus::Rejected,
            _ => VerificationStatus::Never,
        }
    }
}

/// A reachable network location that may or may not host a compatible
/// inference API. See spec §3 for the field-level invariants; they are
/// enforced by the store and the verifier, not by this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoint {
    pub id: i64,
    pub ip: String,
    pub port: i32,
    pub api_type: ApiType,
    pub api_version: Option<String>,
    pub capabilities: Vec<Capability>,
    pub auth_required: bool,
    pub scan_date: DateTime<Utc>,
    pub last_check_date: DateTime<Utc>,
    pub verification_date: Option<DateTime<Utc>>,
    pub verified: VerificationStatus,
    pub is_active: bool,
    pub inactive_reason: Option<String>,
    pub is_honeypot: bool,
    pub honeypot_reason: Option<String>,
    pub added_by: Option<String>,
    pub description: Option<String>,
}

impl Endpoint {
    /// True iff this endpoint is eligible for dispatch: verified, not a
    /// honeypot, currently active.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self.verified, VerificationStatus::Verified) && !self.is_honeypot && self.is_active
    }
}
