// [libs/infra/discovery-sources/src/candidate.rs]
use serde::{Deserialize, Serialize};

/// A prospective `(ip, port)` pair emitted by a Discovery Source (spec
/// §4.5). `promising` drives whether the Scan Controller spends its
/// dynamic-port-scan budget on this candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ip: String,
    pub primary_port: u16,
    pub additional_ports: Option<Vec<u16>>,
    pub promising: bool,
}

impl Candidate {
    pub fn new(ip: impl Into<String>, primary_port: u16, promising: bool) -> Self {
        Self { ip: ip.into(), primary_port, additional_ports: None, promising }
    }

    pub fn with_additional_ports(mut self, ports: Vec<u16>) -> Self {
        self.additional_ports = Some(ports);
        self
    }
}
