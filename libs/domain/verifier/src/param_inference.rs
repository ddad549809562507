// [libs/domain/verifier/src/param_inference.rs]
/*!
 * Fixed pattern table used to infer parameter size / quantization level
 * from a model's *name* when the probe's `/api/tags` response omits the
 * `details` object (spec §4.4: "Parameter size and quantization level may
 * be inferred from the model name when the probe omits them").
 */

use once_cell::sync::Lazy;
use regex::Regex;

static PARAM_IN_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)(b|m)\b").unwrap());
static QUANT_IN_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(q\d(?:_[a-z0-9]+)*|f16|f32)").unwrap());

pub fn infer_parameter_size(name: &str) -> Option<String> {
    PARAM_IN_NAME.captures(name).map(|c| format!("{}{}", &c[1], c[2].to_uppercase()))
}

pub fn infer_quantization_level(name: &str) -> Option<String> {
    QUANT_IN_NAME.captures(name).map(|c| c[1].to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_from_common_naming_convention() {
        assert_eq!(infer_parameter_size("llama3:7b-instruct-q4_k_m"), Some("7B".to_string()));
        assert_eq!(infer_quantization_level("llama3:7b-instruct-q4_k_m"), Some("Q4_K_M".to_string()));
        assert_eq!(infer_parameter_size("phi3:3.8b"), Some("3.8B".to_string()));
    }

    #[test]
    fn returns_none_without_a_match() {
        assert_eq!(infer_parameter_size("mystery-model"), None);
    }
}
