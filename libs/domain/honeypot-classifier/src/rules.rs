// [libs/domain/honeypot-classifier/src/rules.rs]
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use prospector_catalog_models::ProbeResult;
use regex::Regex;

use crate::Verdict;

static WORD_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z]{2,}").unwrap());

const STOP_WORDS: &[&str] = &["the", "a", "and", "is", "to", "in", "it", "you", "that", "of"];

const DECEPTIVE_SIGNATURE_TOKENS: &[&str] = &["deepseek", "r1"];

/// Rule 1: the short generation must be mostly English-looking tokens and,
/// if long enough, contain at least one stop word.
pub(crate) fn response_plausibility_rule(result: &ProbeResult) -> Option<Verdict> {
    let response = result.generate_response.as_deref().unwrap_or("");

    let tokens: Vec<&str> = response.split_whitespace().collect();
    if tokens.is_empty() {
        return Some(Verdict::Invalid("Nonsensical response: empty generation".into()));
    }

    let english_hits = tokens.iter().filter(|t| WORD_LIKE.is_match(t)).count();
    let ratio = english_hits as f64 / tokens.len() as f64;
    if ratio < 0.5 {
        return Some(Verdict::Invalid("Nonsensical response: below English-token threshold".into()));
    }

    if response.len() > 20 {
        let lower = response.to_lowercase();
        let has_stop_word = STOP_WORDS.iter().any(|w| {
            lower.split_whitespace().any(|token| token.trim_matches(|c: char| !c.is_alphanumeric()) == *w)
        });
        if !has_stop_word {
            return Some(Verdict::Invalid("Nonsensical response: no recognizable stop words".into()));
        }
    }

    None
}

/// Rule 2: ≥ 80% of advertised models match `deepseek` or `r1`.
pub(crate) fn model_signature_rule(result: &ProbeResult) -> Option<Verdict> {
    if result.tags_models.is_empty() {
        return None;
    }
    let hits = result
        .tags_models
        .iter()
        .filter(|m| {
            let name = m.name.to_lowercase();
            DECEPTIVE_SIGNATURE_TOKENS.iter().any(|sig| name.contains(sig))
        })
        .count();
    let ratio = hits as f64 / result.tags_models.len() as f64;
    if ratio >= 0.8 {
        return Some(Verdict::Honeypot("Model-set signature: fake-ollama DeepSeek/R1 pattern".into()));
    }
    None
}

/// Rule 3: implausible token-generation rate.
pub(crate) fn timing_plausibility_rule(result: &ProbeResult) -> Option<Verdict> {
    let metrics = result.generate_metrics.as_ref()?;
    let tps = metrics.tokens_per_second_computed()?;
    if tps > 1000.0 {
        return Some(Verdict::Honeypot(format!("Timing plausibility: implausible token rate ({tps:.0} tok/s)")));
    }
    None
}

/// Rule 4: more than 3 advertised models, all reporting an identical size.
pub(crate) fn size_uniformity_rule(result: &ProbeResult) -> Option<Verdict> {
    if result.tags_models.len() <= 3 {
        return None;
    }
    let mut sizes = result.tags_models.iter().map(|m| m.size_mb);
    let first = sizes.next().flatten()?;
    let all_identical = result.tags_models.iter().all(|m| m.size_mb == Some(first));
    if all_identical {
        return Some(Verdict::Honeypot("Size-uniformity signature: all advertised models share one size".into()));
    }
    None
}

/// Rule 5: the system-prompt probe asked for a short answer but the model
/// produced more than 25 words.
pub(crate) fn system_prompt_adherence_rule(result: &ProbeResult) -> Option<Verdict> {
    let response = result.system_generate_response.as_deref()?;
    let word_count = response.split_whitespace().count();
    if word_count > 25 {
        return Some(Verdict::Honeypot(format!("System-prompt adherence: ignores system prompt ({word_count} words)")));
    }
    None
}

/// Supplemental rule (SPEC_FULL §C): rejects responses that are
/// byte-identical to one seen from a *different* endpoint earlier in this
/// scan run — evidence of a shared canned-response pool. Kept separate
/// from the core five so C3 itself stays a pure function; the ledger is
/// owned and mutated by the Verifier, not the classifier.
pub(crate) fn canned_response_rule(result: &ProbeResult, ledger: &RecentResponseLedger) -> Option<Verdict> {
    let response = result.generate_response.as_deref()?;
    if ledger.contains(response) {
        return Some(Verdict::Honeypot("Canned-response signature: identical generation seen on another endpoint".into()));
    }
    None
}

/// A bounded, thread-safe ledger of recent generate-step responses, keyed
/// by exact text, shared across concurrent Verifier workers. Bounded to
/// avoid unbounded memory growth over a long scan run.
pub struct RecentResponseLedger {
    capacity: usize,
    seen: Mutex<(HashSet<String>, VecDeque<String>)>,
}

impl RecentResponseLedger {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, seen: Mutex::new((HashSet::new(), VecDeque::new())) }
    }

    pub fn contains(&self, response: &str) -> bool {
        self.seen.lock().expect("ledger mutex poisoned").0.contains(response)
    }

    /// Records a response, evicting the oldest entry once over capacity.
    pub fn record(&self, response: &str) {
        let mut guard = self.seen.lock().expect("ledger mutex poisoned");
        let (set, queue) = &mut *guard;
        if set.insert(response.to_string()) {
            queue.push_back(response.to_string());
            if queue.len() > self.capacity {
                if let Some(oldest) = queue.pop_front() {
                    set.remove(&oldest);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_evicts_oldest_past_capacity() {
        let ledger = RecentResponseLedger::new(2);
        ledger.record("a");
        ledger.record("b");
        ledger.record("c");
        assert!(!ledger.contains("a"));
        assert!(ledger.contains("b"));
        assert!(ledger.contains("c"));
    }
}
