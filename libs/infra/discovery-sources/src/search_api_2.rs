// [libs/infra/discovery-sources/src/search_api_2.rs]
/*!
 * "Censys-style" search source (spec §4.5). Queries target HTTP response
 * body and service metadata; port selection prefers the service whose
 * banner mentions "ollama is running", then 11434, then the first one
 * observed. Results are marked `promising = true`, same contract as
 * Search-API-1.
 */

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::candidate::Candidate;
use crate::errors::DiscoverySourceError;

const BASE_URL: &str = "https://search.censys.io/api/v2/hosts/search";
const FIXED_QUERIES: &[&str] = &[
    r#"services.http.response.body: "ollama is running""#,
    "services.port: 11434",
];
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const PREFERRED_PORT: u16 = 11434;
const OLLAMA_BANNER_NEEDLE: &str = "ollama is running";

#[derive(Debug, Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    result: SearchResult,
}

#[derive(Debug, Deserialize, Default)]
struct SearchResult {
    #[serde(default)]
    hits: Vec<HostHit>,
    #[serde(default)]
    links: Links,
}

#[derive(Debug, Deserialize, Default)]
struct Links {
    next: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct HostHit {
    ip: Option<String>,
    #[serde(default)]
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize, Default)]
struct ServiceEntry {
    port: Option<u16>,
    #[serde(default)]
    banner: Option<String>,
}

/// Selects which discovered port becomes `primary_port`, per spec §4.5's
/// preference order.
fn select_primary_port(services: &[ServiceEntry]) -> Option<(u16, Vec<u16>)> {
    let all_ports: Vec<u16> = services.iter().filter_map(|s| s.port).collect();
    if all_ports.is_empty() {
        return None;
    }

    let primary = services
        .iter()
        .find(|s| s.banner.as_deref().is_some_and(|b| b.to_lowercase().contains(OLLAMA_BANNER_NEEDLE)))
        .and_then(|s| s.port)
        .or_else(|| all_ports.iter().copied().find(|p| *p == PREFERRED_PORT))
        .unwrap_or(all_ports[0]);

    let additional: Vec<u16> = all_ports.into_iter().filter(|p| *p != primary).collect();
    Some((primary, additional))
}

#[instrument(skip(client, api_id, api_secret, sender))]
pub async fn run(client: &Client, api_id: &str, api_secret: &str, sender: mpsc::UnboundedSender<Candidate>) {
    let mut seen_ips: HashSet<String> = HashSet::new();

    for query in FIXED_QUERIES {
        if let Err(error) = run_query(client, api_id, api_secret, query, &mut seen_ips, &sender).await {
            warn!("search-api-2 query {:?} aborted: {}", query, error);
        }
    }
}

async fn run_query(
    client: &Client,
    api_id: &str,
    api_secret: &str,
    query: &str,
    seen_ips: &mut HashSet<String>,
    sender: &mpsc::UnboundedSender<Candidate>,
) -> Result<(), DiscoverySourceError> {
    let mut cursor: Option<String> = None;

    loop {
        let response = fetch_page(client, api_id, api_secret, query, cursor.as_deref()).await?;
        if response.result.hits.is_empty() {
            break;
        }

        for hit in &response.result.hits {
            let Some(ip) = hit.ip.clone() else { continue };
            if !seen_ips.insert(ip.clone()) {
                continue;
            }
            let Some((primary_port, additional)) = select_primary_port(&hit.services) else { continue };

            let mut candidate = Candidate::new(ip, primary_port, true);
            if !additional.is_empty() {
                candidate = candidate.with_additional_ports(additional);
            }

            if sender.send(candidate).is_err() {
                debug!("search-api-2 receiver dropped, stopping query early");
                return Ok(());
            }
        }

        cursor = response.result.links.next;
        if cursor.is_none() {
            break;
        }
    }

    Ok(())
}

async fn fetch_page(
    client: &Client,
    api_id: &str,
    api_secret: &str,
    query: &str,
    cursor: Option<&str>,
) -> Result<SearchResponse, DiscoverySourceError> {
    for attempt in 1..=MAX_RATE_LIMIT_RETRIES {
        let mut request = client.get(BASE_URL).basic_auth(api_id, Some(api_secret)).query(&[("q", query)]);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request.send().await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let backoff = Duration::from_secs(10 * attempt as u64);
            warn!("search-api-2 rate-limited, backing off {:?} (attempt {})", backoff, attempt);
            tokio::time::sleep(backoff).await;
            continue;
        }

        if !response.status().is_success() {
            return Err(DiscoverySourceError::Protocol(format!("HTTP {}", response.status())));
        }

        return Ok(response.json::<SearchResponse>().await?);
    }

    Err(DiscoverySourceError::RateLimited { attempts: MAX_RATE_LIMIT_RETRIES })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_banner_match_over_default_port() {
        let services = vec![
            ServiceEntry { port: Some(8080), banner: Some("nginx".into()) },
            ServiceEntry { port: Some(3000), banner: Some("Ollama is running".into()) },
        ];
        let (primary, additional) = select_primary_port(&services).unwrap();
        assert_eq!(primary, 3000);
        assert_eq!(additional, vec![8080]);
    }

    #[test]
    fn falls_back_to_preferred_port_without_banner_match() {
        let services = vec![ServiceEntry { port: Some(8080), banner: None }, ServiceEntry { port: Some(11434), banner: None }];
        let (primary, _) = select_primary_port(&services).unwrap();
        assert_eq!(primary, 11434);
    }

    #[test]
    fn falls_back_to_first_port_otherwise() {
        let services = vec![ServiceEntry { port: Some(9090), banner: None }, ServiceEntry { port: Some(9091), banner: None }];
        let (primary, _) = select_primary_port(&services).unwrap();
        assert_eq!(primary, 9090);
    }
}
