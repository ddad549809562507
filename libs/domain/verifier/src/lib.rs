// [libs/domain/verifier/src/lib.rs]
/*!
 * =================================================================
 * APARATO: VERIFIER
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L4)
 * RESPONSABILIDAD: ORQUESTACIÓN DE UN CANDIDATO DE EXTREMO A EXTREMO
 *
 * Wires the Probe Client and Honeypot Classifier together for one
 * candidate and applies the outcome to the Catalog Store (spec §4.4).
 *
 * The source describes this as one continuous transaction spanning the
 * probe itself. §9's design notes forbid holding a store connection
 * across remote I/O, so this implementation splits the algorithm into
 * three phases instead of one transaction:
 *   tx1 — discovery-time upsert, commits before any network call.
 *   probe + classify — pure network I/O and a pure function, no store
 *     handle held at all.
 *   tx2 — outcome application (mark_valid/honeypot/invalid, the
 *     VerifiedEndpoint marker, model reconciliation, history append),
 *     one atomic unit.
 * A crash between tx1 and tx2 leaves the endpoint at its discovery-time
 * state, which is exactly the state the run already committed — no
 * reader ever observes a half-applied verdict.
 * =================================================================
 */

pub mod benchmark;
pub mod errors;
pub mod param_inference;

use std::sync::Arc;

use chrono::Utc;
use prospector_catalog_models::capability::Capability;
use prospector_catalog_models::{ApiType, ObservedModel, ProbeError, VerificationStatus};
use prospector_catalog_store::repositories::{endpoint, model, verification_history, verified_endpoint};
use prospector_catalog_store::CatalogStore;
use prospector_honeypot_classifier::{classify, RecentResponseLedger, Verdict};
use prospector_probe_client::ProbeClient;
use tracing::{info, instrument, warn};

pub use benchmark::run_benchmark;
pub use errors::VerifierError;

/// Scan-time hint passed in by a Discovery Source or admin command; maps
/// onto the discovery-time `verified` seed (spec §4.4 step 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Verified,
    Unverified,
}

/// Summary of one `verify()` run, returned to the Scan Controller for its
/// progress counters.
#[derive(Debug, Clone)]
pub struct VerifierOutcome {
    pub endpoint_id: i64,
    pub verdict_kind: VerdictKind,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerdictKind {
    Valid,
    Honeypot,
    Invalid,
    AuthRequired,
}

pub struct Verifier {
    store: CatalogStore,
    probe_client: ProbeClient,
    recent_responses: Option<Arc<RecentResponseLedger>>,
}

impl Verifier {
    pub fn new(store: CatalogStore, probe_client: ProbeClient) -> Self {
        Self { store, probe_client, recent_responses: None }
    }

    /// Enables the supplemental canned-response rule across the lifetime of
    /// this `Verifier` (SPEC_FULL §C); shared across workers via `Arc`.
    pub fn with_response_ledger(mut self, ledger: Arc<RecentResponseLedger>) -> Self {
        self.recent_responses = Some(ledger);
        self
    }

    /// Orchestrates one candidate end-to-end per spec §4.4.
    #[instrument(skip(self), fields(%ip, %port))]
    pub async fn verify(
        &self,
        ip: &str,
        port: u16,
        scan_status: ScanStatus,
        preserve_verified: bool,
    ) -> Result<VerifierOutcome, VerifierError> {
        let now = Utc::now();
        let scan_verified = match scan_status {
            ScanStatus::Verified => VerificationStatus::Verified,
            ScanStatus::Unverified => VerificationStatus::Never,
        };

        // Step 1-2: discovery-time upsert, its own short transaction.
        let discovered = self
            .store
            .transaction(|tx| {
                Box::pin(async move {
                    endpoint::upsert_on_discovery(tx, ip, port as i32, scan_verified, preserve_verified, now).await
                })
            })
            .await?;
        let endpoint_id = discovered.id;

        // Step 3: probe the candidate. No store handle is held here.
        let probe_result = self.probe_client.probe(ip, port).await;

        if let Some(error) = &probe_result.error {
            return self.apply_probe_failure(endpoint_id, error, now).await;
        }

        // Step 4: classify. Pure function, no I/O.
        let verdict = classify(&probe_result, self.recent_responses.as_deref());

        // Step 5-6: apply the outcome inside its own transaction.
        let observed: Vec<ObservedModel> = probe_result
            .tags_models
            .iter()
            .cloned()
            .map(|mut m| {
                if m.parameter_size.is_none() {
                    m.parameter_size = param_inference::infer_parameter_size(&m.name);
                }
                if m.quantization_level.is_none() {
                    m.quantization_level = param_inference::infer_quantization_level(&m.name);
                }
                m
            })
            .collect();

        let response_sample = probe_result.generate_response.clone().unwrap_or_default();
        let detected_models = serde_json::to_value(&observed).unwrap_or(serde_json::Value::Null);
        let metrics = probe_result.generate_metrics.clone().unwrap_or_default();

        match &verdict {
            Verdict::Valid => {
                let api_type = if probe_result.version.is_some() { ApiType::Ollama } else { ApiType::Unknown };
                let capabilities = vec![Capability::Chat, Capability::Completion];

                self.store
                    .transaction(|tx| {
                        let observed = observed.clone();
                        let response_sample = response_sample.clone();
                        let detected_models = detected_models.clone();
                        let metrics = metrics.clone();
                        Box::pin(async move {
                            endpoint::mark_valid(tx, endpoint_id, api_type, None, &capabilities, now).await?;
                            verified_endpoint::upsert(tx, endpoint_id, Some("probe"), now).await?;
                            model::reconcile(tx, endpoint_id, &observed).await?;
                            verification_history::append(
                                tx,
                                endpoint_id,
                                now,
                                &response_sample,
                                &detected_models,
                                false,
                                &metrics,
                            )
                            .await
                        })
                    })
                    .await?;

                info!(endpoint_id, "verified endpoint as valid");
                Ok(VerifierOutcome { endpoint_id, verdict_kind: VerdictKind::Valid, reason: None })
            }
            Verdict::Honeypot(reason) => {
                let reason = reason.clone();
                self.store
                    .transaction(|tx| {
                        let reason = reason.clone();
                        let response_sample = response_sample.clone();
                        let detected_models = detected_models.clone();
                        let metrics = metrics.clone();
                        Box::pin(async move {
                            endpoint::mark_honeypot(tx, endpoint_id, &reason, now).await?;
                            verified_endpoint::delete(tx, endpoint_id).await?;
                            verification_history::append(
                                tx,
                                endpoint_id,
                                now,
                                &response_sample,
                                &detected_models,
                                true,
                                &metrics,
                            )
                            .await
                        })
                    })
                    .await?;

                warn!(endpoint_id, %reason, "classified endpoint as honeypot");
                Ok(VerifierOutcome { endpoint_id, verdict_kind: VerdictKind::Honeypot, reason: Some(reason) })
            }
            Verdict::Invalid(reason) => {
                let reason = reason.clone();
                self.store
                    .transaction(|tx| {
                        let reason = reason.clone();
                        let response_sample = response_sample.clone();
                        let detected_models = detected_models.clone();
                        let metrics = metrics.clone();
                        Box::pin(async move {
                            endpoint::mark_invalid(tx, endpoint_id, &reason, false, now).await?;
                            verified_endpoint::delete(tx, endpoint_id).await?;
                            verification_history::append(
                                tx,
                                endpoint_id,
                                now,
                                &response_sample,
                                &detected_models,
                                false,
                                &metrics,
                            )
                            .await
                        })
                    })
                    .await?;

                Ok(VerifierOutcome { endpoint_id, verdict_kind: VerdictKind::Invalid, reason: Some(reason) })
            }
        }
    }

    /// A failed probe (TransportError/ProtocolError/auth) never reaches the
    /// classifier; it maps straight to Invalid or auth-required (spec §7).
    async fn apply_probe_failure(
        &self,
        endpoint_id: i64,
        error: &ProbeError,
        now: chrono::DateTime<Utc>,
    ) -> Result<VerifierOutcome, VerifierError> {
        let reason = error.display_reason();
        let auth_required = error.auth_required;

        self.store
            .transaction(|tx| {
                let reason = reason.clone();
                Box::pin(async move {
                    endpoint::mark_invalid(tx, endpoint_id, &reason, auth_required, now).await?;
                    verified_endpoint::delete(tx, endpoint_id).await?;
                    verification_history::append(
                        tx,
                        endpoint_id,
                        now,
                        "",
                        &serde_json::Value::Null,
                        false,
                        &Default::default(),
                    )
                    .await
                })
            })
            .await?;

        let verdict_kind = if auth_required { VerdictKind::AuthRequired } else { VerdictKind::Invalid };
        Ok(VerifierOutcome { endpoint_id, verdict_kind, reason: Some(reason) })
    }
}
