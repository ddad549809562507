// [libs/infra/probe-client/src/model_pick.rs]
use once_cell::sync::Lazy;
use regex::Regex;

use crate::wire::TagModel;

/// Name fragments that hint at a small, fast-to-run model, checked in
/// order when no model reports a `size` (spec §4.2 step 2).
const SMALL_MODEL_HINTS: &[&str] = &["tiny", "small", "mini", "1b", "1.5b", "3b", "7b", "135m"];

static HINT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", SMALL_MODEL_HINTS.join("|"))).unwrap()
});

/// Picks the model to run the cheap probe generation against: prefer the
/// smallest by reported `size`; otherwise a heuristic name match; otherwise
/// the first model in the list.
pub fn pick_smallest<'a>(models: &'a [TagModel]) -> Option<&'a TagModel> {
    if models.is_empty() {
        return None;
    }

    if let Some(smallest) = models.iter().filter(|m| m.size.is_some()).min_by_key(|m| m.size.unwrap()) {
        return Some(smallest);
    }

    if let Some(hinted) = models.iter().find(|m| HINT_PATTERN.is_match(&m.name)) {
        return Some(hinted);
    }

    models.first()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(name: &str, size: Option<i64>) -> TagModel {
        TagModel { name: name.to_string(), size, details: None }
    }

    #[test]
    fn prefers_smallest_by_size() {
        let models = vec![model("big", Some(9_000)), model("small", Some(100))];
        assert_eq!(pick_smallest(&models).unwrap().name, "small");
    }

    #[test]
    fn falls_back_to_name_hint_without_sizes() {
        let models = vec![model("llama3-70b", None), model("llama3-7b-instruct", None)];
        assert_eq!(pick_smallest(&models).unwrap().name, "llama3-7b-instruct");
    }

    #[test]
    fn falls_back_to_first_without_any_signal() {
        let models = vec![model("alpha", None), model("beta", None)];
        assert_eq!(pick_smallest(&models).unwrap().name, "alpha");
    }
}
