// [libs/domain/honeypot-classifier/src/lib.rs]
/*!
 * =================================================================
 * APARATO: HONEYPOT CLASSIFIER
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L5)
 * RESPONSABILIDAD: VEREDICTO PURO SOBRE UN ProbeResult
 *
 * Pure function, no I/O, no shared state. Five ordered rules (spec §4.3);
 * an exception inside rules 2-5 degrades to "no evidence", never promotes
 * to Honeypot on its own.
 * =================================================================
 */

mod rules;

use prospector_catalog_models::ProbeResult;

pub use rules::RecentResponseLedger;

/// Outcome of classifying a `ProbeResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid(String),
    Honeypot(String),
}

impl Verdict {
    pub fn is_honeypot(&self) -> bool {
        matches!(self, Verdict::Honeypot(_))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Verdict::Valid => None,
            Verdict::Invalid(r) | Verdict::Honeypot(r) => Some(r),
        }
    }
}

/// Classifies a completed probe. `result.error` must be `None` — a failed
/// probe never reaches the classifier; the verifier maps `ProbeError`
/// straight to `Invalid`/`AuthRequired` without consulting this function.
///
/// `recent_responses` is the optional supplemental signature (SPEC_FULL §C):
/// a small ledger of response hashes seen across *other* endpoints in this
/// scan run, used to catch a canned-response pool that the five core rules
/// would otherwise miss. Pass `None` to run only the five core rules.
pub fn classify(result: &ProbeResult, recent_responses: Option<&RecentResponseLedger>) -> Verdict {
    debug_assert!(result.error.is_none(), "classifier must not see a failed probe");

    // Rule 1: response plausibility. Deterministic, no exception handling
    // needed — a failure here ends evaluation immediately.
    if let Some(verdict) = rules::response_plausibility_rule(result) {
        return verdict;
    }

    // Rules 2-5: honeypot signatures, evaluated in spec order. Each rule
    // function already swallows its own internal failures and returns
    // `None` ("no evidence") rather than panicking the whole classifier.
    if let Some(verdict) = rules::model_signature_rule(result) {
        return verdict;
    }
    if let Some(verdict) = rules::timing_plausibility_rule(result) {
        return verdict;
    }
    if let Some(verdict) = rules::size_uniformity_rule(result) {
        return verdict;
    }
    if let Some(verdict) = rules::system_prompt_adherence_rule(result) {
        return verdict;
    }

    // Supplemental rule 6 (SPEC_FULL §C): canned-response pool detection,
    // only consulted when the caller supplies a ledger of recent hashes.
    if let Some(ledger) = recent_responses {
        if let Some(verdict) = rules::canned_response_rule(result, ledger) {
            return verdict;
        }
    }

    Verdict::Valid
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospector_catalog_models::{ObservedModel, ResponseMetrics};

    fn base_result() -> ProbeResult {
        ProbeResult {
            tags_models: vec![ObservedModel {
                name: "llama3".into(),
                parameter_size: Some("7B".into()),
                quantization_level: Some("Q4_K_M".into()),
                size_mb: Some(3814.7),
            }],
            generate_response: Some("Hello! I am running fine today.".into()),
            generate_metrics: Some(ResponseMetrics {
                eval_count: Some(7),
                eval_duration_ns: Some(200_000_000),
                tokens_per_second: None,
                first_token_latency_ms: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn plausible_response_is_valid() {
        assert_eq!(classify(&base_result(), None), Verdict::Valid);
    }

    #[test]
    fn deepseek_signature_is_honeypot() {
        let mut r = base_result();
        r.tags_models = vec![
            ObservedModel { name: "deepseek-r1:7b".into(), parameter_size: None, quantization_level: None, size_mb: None },
            ObservedModel { name: "deepseek-coder".into(), parameter_size: None, quantization_level: None, size_mb: None },
            ObservedModel { name: "r1-distill".into(), parameter_size: None, quantization_level: None, size_mb: None },
            ObservedModel { name: "r1-mini".into(), parameter_size: None, quantization_level: None, size_mb: None },
            ObservedModel { name: "llama3".into(), parameter_size: None, quantization_level: None, size_mb: None },
        ];
        assert!(classify(&r, None).is_honeypot());
    }

    #[test]
    fn implausible_token_rate_is_honeypot() {
        let mut r = base_result();
        r.generate_metrics = Some(ResponseMetrics {
            eval_count: Some(5000),
            eval_duration_ns: Some(2_000_000_000),
            tokens_per_second: None,
            first_token_latency_ms: None,
        });
        let verdict = classify(&r, None);
        assert!(verdict.is_honeypot());
        assert!(verdict.reason().unwrap().contains("rate"));
    }

    #[test]
    fn nonsensical_response_is_invalid() {
        let mut r = base_result();
        r.generate_response = Some("xqz vvv zzz".into());
        let verdict = classify(&r, None);
        assert_eq!(verdict, Verdict::Invalid("Nonsensical response: below English-token threshold".into()));
    }

    #[test]
    fn uniform_size_with_many_models_is_honeypot() {
        let mut r = base_result();
        r.tags_models = (0..5)
            .map(|i| ObservedModel { name: format!("model-{i}"), parameter_size: None, quantization_level: None, size_mb: Some(1000.0) })
            .collect();
        assert!(classify(&r, None).is_honeypot());
    }

    #[test]
    fn ignoring_system_prompt_is_honeypot() {
        let mut r = base_result();
        r.system_generate_response = Some("word ".repeat(30));
        assert!(classify(&r, None).is_honeypot());
    }
}
