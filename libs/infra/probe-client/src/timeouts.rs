// [libs/infra/probe-client/src/timeouts.rs]
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

const BASE_SECONDS: f64 = 180.0;
const MIN_SECONDS: f64 = 60.0;
const MAX_SECONDS: f64 = 1800.0;

static PARAM_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*b\b").unwrap());

/// Parses a parameter-count suffix like `"7B"` or `"1.5B"` into billions of
/// parameters; `None` for anything that doesn't match (e.g. `"135M"`).
pub fn parse_param_billions(parameter_size: &str) -> Option<f64> {
    PARAM_SUFFIX.captures(parameter_size).and_then(|c| c.get(1)).and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Adaptive timeout for inference forwarding (spec §4.2, not used by
/// verification's fixed per-step deadlines). A caller-supplied override of
/// `Some(0)` disables the timeout entirely (returns `None`).
pub fn adaptive_timeout(
    parameter_size: Option<&str>,
    prompt_len: usize,
    max_tokens: u32,
    override_seconds: Option<u64>,
) -> Option<Duration> {
    if override_seconds == Some(0) {
        return None;
    }
    if let Some(secs) = override_seconds {
        return Some(Duration::from_secs(secs));
    }

    let param_factor = parameter_size.and_then(parse_param_billions).map(|b| (b / 7.0).max(0.25)).unwrap_or(1.0);
    let prompt_factor = 1.0 + (prompt_len as f64 / 1000.0);
    let token_factor = (max_tokens as f64 / 1000.0).max(1.0);

    let raw = BASE_SECONDS * param_factor * prompt_factor * token_factor;
    let bounded = raw.clamp(MIN_SECONDS, MAX_SECONDS);
    Some(Duration::from_secs_f64(bounded))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_billion_suffix() {
        assert_eq!(parse_param_billions("7B"), Some(7.0));
        assert_eq!(parse_param_billions("1.5B"), Some(1.5));
        assert_eq!(parse_param_billions("135M"), None);
    }

    #[test]
    fn zero_override_disables_timeout() {
        assert_eq!(adaptive_timeout(Some("7B"), 100, 100, Some(0)), None);
    }

    #[test]
    fn explicit_override_wins() {
        assert_eq!(adaptive_timeout(Some("7B"), 100, 100, Some(42)), Some(Duration::from_secs(42)));
    }

    #[test]
    fn bounds_stay_within_60_and_1800() {
        let short = adaptive_timeout(None, 0, 1, None).unwrap();
        assert!(short.as_secs_f64() >= MIN_SECONDS);
        let long = adaptive_timeout(Some("70B"), 50_000, 50_000, None).unwrap();
        assert!(long.as_secs_f64() <= MAX_SECONDS);
    }
}
