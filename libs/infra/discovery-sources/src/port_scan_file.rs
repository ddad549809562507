// [libs/infra/discovery-sources/src/port_scan_file.rs]
/*!
 * Parses grepable port-scan output (`Host: <ip> Ports: <port>/open`) into
 * `Candidate` values (spec §4.5). Only the output *format* is parsed here;
 * running the scanner itself is out of scope (SPEC_FULL §D).
 */

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{instrument, warn};

use crate::candidate::Candidate;
use crate::errors::DiscoverySourceError;

static GREPABLE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Host:\s*(\S+).*?Ports:\s*(\d+)/open").unwrap()
});

/// Parses one grepable line, returning `None` for lines that don't match
/// the expected shape (headers, blank lines, closed-port entries).
pub fn parse_line(line: &str) -> Option<Candidate> {
    let captures = GREPABLE_LINE.captures(line)?;
    let ip = captures.get(1)?.as_str().to_string();
    let port: u16 = captures.get(2)?.as_str().parse().ok()?;
    Some(Candidate::new(ip, port, false))
}

/// Streams candidates from a grepable port-scan file, line by line, so an
/// arbitrarily large scan result never needs to be held in memory at once.
#[instrument(skip(sender))]
pub async fn run(path: &std::path::Path, sender: mpsc::UnboundedSender<Candidate>) -> Result<(), DiscoverySourceError> {
    let file = tokio::fs::File::open(path).await?;
    let mut lines = BufReader::new(file).lines();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Some(candidate) => {
                if sender.send(candidate).is_err() {
                    break;
                }
            }
            None => warn!("port-scan-file: skipped unparseable line"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_grepable_line() {
        let candidate = parse_line("Host: 203.0.113.5 () Ports: 11434/open/tcp//ollama///").unwrap();
        assert_eq!(candidate.ip, "203.0.113.5");
        assert_eq!(candidate.primary_port, 11434);
        assert!(!candidate.promising);
    }

    #[test]
    fn ignores_closed_port_lines() {
        assert!(parse_line("Host: 203.0.113.5 () Ports: 22/closed/tcp//ssh///").is_none());
    }

    #[test]
    fn ignores_header_lines() {
        assert!(parse_line("# Masscan scan report").is_none());
    }
}
