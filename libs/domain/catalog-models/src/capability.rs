// [libs/domain/catalog-models/src/capability.rs]
use serde::{Deserialize, Serialize};
use std::fmt;

/// One capability an endpoint may advertise, drawn from the fixed set in §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Chat,
    Completion,
    Embedding,
    Vision,
    Audio,
    FunctionCalling,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Chat,
        Capability::Completion,
        Capability::Embedding,
        Capability::Vision,
        Capability::Audio,
        Capability::FunctionCalling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Chat => "chat",
            Capability::Completion => "completion",
            Capability::Embedding => "embedding",
            Capability::Vision => "vision",
            Capability::Audio => "audio",
            Capability::FunctionCalling => "function_calling",
        }
    }

    pub fn parse(raw: &str) -> Option<Capability> {
        Capability::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serializes/parses a `Vec<Capability>` to/from the comma-joined column the
/// store persists it as (`endpoints.capabilities`).
pub fn capabilities_to_column(caps: &[Capability]) -> String {
    caps.iter().map(Capability::as_str).collect::<Vec<_>>().join(",")
}

pub fn capabilities_from_column(column: &str) -> Vec<Capability> {
    column
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(Capability::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_column_encoding() {
        let caps = vec![Capability::Chat, Capability::Vision];
        let column = capabilities_to_column(&caps);
        assert_eq!(capabilities_from_column(&column), caps);
    }

    #[test]
    fn ignores_unknown_tokens() {
        assert_eq!(capabilities_from_column("chat,bogus,vision"), vec![Capability::Chat, Capability::Vision]);
    }
}
