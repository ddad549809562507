// [libs/infra/discovery-sources/src/search_api_1.rs]
/*!
 * "Shodan-style" paginated search source (spec §4.5). A fixed query set
 * covering product filter, port filter and HTTP-body keywords; IP-deduped
 * within one run; every result is marked `promising = true`.
 */

use std::collections::HashSet;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use crate::candidate::Candidate;
use crate::errors::DiscoverySourceError;

const BASE_URL: &str = "https://www.shodan.io/api/search";
const FIXED_QUERIES: &[&str] = &[
    r#"product:"Ollama""#,
    "port:11434",
    r#"http.html:"ollama is running""#,
];
const MAX_RATE_LIMIT_RETRIES: u32 = 3;
const MAX_PAGES_PER_QUERY: u32 = 50;

#[derive(Debug, Deserialize, Default)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<SearchMatch>,
    #[serde(default)]
    total: u64,
}

#[derive(Debug, Deserialize, Default)]
struct SearchMatch {
    ip_str: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    ports: Vec<u16>,
}

/// Runs every fixed query to exhaustion, sending deduplicated candidates
/// down `sender`. A query's non-rate-limit failure aborts only that query.
#[instrument(skip(client, api_key, sender))]
pub async fn run(client: &Client, api_key: &str, sender: mpsc::UnboundedSender<Candidate>) {
    let mut seen_ips: HashSet<String> = HashSet::new();

    for query in FIXED_QUERIES {
        if let Err(error) = run_query(client, api_key, query, &mut seen_ips, &sender).await {
            warn!("search-api-1 query {:?} aborted: {}", query, error);
        }
    }
}

async fn run_query(
    client: &Client,
    api_key: &str,
    query: &str,
    seen_ips: &mut HashSet<String>,
    sender: &mpsc::UnboundedSender<Candidate>,
) -> Result<(), DiscoverySourceError> {
    let mut page = 1u32;

    loop {
        if page > MAX_PAGES_PER_QUERY {
            break;
        }

        let response = fetch_page(client, api_key, query, page).await?;
        if response.matches.is_empty() {
            break;
        }

        for entry in &response.matches {
            let Some(ip) = entry.ip_str.clone() else { continue };
            if !seen_ips.insert(ip.clone()) {
                continue;
            }
            let Some(primary_port) = entry.port else { continue };

            let additional: Vec<u16> = entry.ports.iter().copied().filter(|p| *p != primary_port).collect();
            let mut candidate = Candidate::new(ip, primary_port, true);
            if !additional.is_empty() {
                candidate = candidate.with_additional_ports(additional);
            }

            if sender.send(candidate).is_err() {
                debug!("search-api-1 receiver dropped, stopping query early");
                return Ok(());
            }
        }

        if (page as u64 * response.matches.len() as u64) >= response.total {
            break;
        }
        page += 1;
    }

    Ok(())
}

async fn fetch_page(client: &Client, api_key: &str, query: &str, page: u32) -> Result<SearchResponse, DiscoverySourceError> {
    for attempt in 1..=MAX_RATE_LIMIT_RETRIES {
        let response = client
            .get(BASE_URL)
            .query(&[("key", api_key), ("query", query), ("page", &page.to_string())])
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            let backoff = Duration::from_secs(10 * attempt as u64);
            warn!("search-api-1 rate-limited, backing off {:?} (attempt {})", backoff, attempt);
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
