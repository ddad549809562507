// [libs/domain/catalog-models/src/probe.rs]
use serde::{Deserialize, Serialize};

use crate::model::ObservedModel;
use crate::verification::ResponseMetrics;

/// Which probe step (§4.2) produced a failure, kept on `ProbeError` so the
/// verifier and classifier can attribute a reason to the right step
/// (boundary test in spec §8: "reason containing 'Generate'").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeStep {
    Tags,
    Generate,
    SystemGenerate,
    Version,
    ProcessList,
}

impl ProbeStep {
    pub fn label(&self) -> &'static str {
        match self {
            ProbeStep::Tags => "Tags",
            ProbeStep::Generate => "Generate",
            ProbeStep::SystemGenerate => "SystemGenerate",
            ProbeStep::Version => "Version",
            ProbeStep::ProcessList => "ProcessList",
        }
    }
}

/// A failure from a single probe step. `TransportError`/`ProtocolError` in
/// spec §7 terms; `step` says where it happened, `auth_required` flags a
/// 401/403 short-circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeError {
    pub step: ProbeStep,
    pub reason: String,
    pub auth_required: bool,
}

impl ProbeError {
    pub fn new(step: ProbeStep, reason: impl Into<String>) -> Self {
        Self { step, reason: reason.into(), auth_required: false }
    }

    pub fn auth_required(step: ProbeStep) -> Self {
        Self { step, reason: "HTTP 401/403".to_string(), auth_required: true }
    }

    /// Matches spec §8 boundary: "reason containing 'Generate'".
    pub fn display_reason(&self) -> String {
        format!("{}: {}", self.step.label(), self.reason)
    }
}

/// The full evidence collected for one candidate by the Probe Client
/// (§4.2). Built up step by step; a missing step simply leaves its field
/// `None`. Consumed read-only by the Honeypot Classifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeResult {
    pub tags_models: Vec<ObservedModel>,
    pub tags_raw: Option<serde_json::Value>,
    pub generate_response: Option<String>,
    pub generate_metrics: Option<ResponseMetrics>,
    pub system_generate_response: Option<String>,
    pub version: Option<String>,
    pub process_list: Option<serde_json::Value>,
    pub error: Option<ProbeError>,
}

impl ProbeResult {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}
