// [apps/scanner/src/intake.rs]
/*!
 * Bridges a Discovery Source to the Scan Controller: collects the
 * source's candidate stream, dedupes against IPs already seen this run,
 * and forwards the rest down the controller's channel.
 */

use std::collections::HashSet;
use std::sync::Arc;

use prospector_discovery_sources::{errors::DiscoverySourceError, port_scan_file, search_api_1, search_api_2, Candidate};
use tokio::sync::mpsc;
use tracing::warn;

use crate::controller::ScanController;

/// Drains `source_rx` into `sink`, recording a duplicate with `controller`
/// for every IP already seen this run instead of forwarding it.
pub async fn forward_deduped(
    controller: &ScanController,
    mut source_rx: mpsc::UnboundedReceiver<Candidate>,
    sink: &mpsc::UnboundedSender<Candidate>,
    seen: &mut HashSet<String>,
) {
    while let Some(candidate) = source_rx.recv().await {
        if !seen.insert(candidate.ip.clone()) {
            controller.record_duplicate();
            continue;
        }
        if sink.send(candidate).is_err() {
            break;
        }
    }
}

pub async fn run_shodan(controller: &ScanController, http: &reqwest::Client, sink: mpsc::UnboundedSender<Candidate>) -> anyhow::Result<()> {
    let api_key = std::env::var("SHODAN_API_KEY").map_err(|_| anyhow::anyhow!("SHODAN_API_KEY is not set"))?;
    let (tx, rx) = mpsc::unbounded_channel();
    let mut seen = HashSet::new();
    tokio::join!(search_api_1::run(http, &api_key, tx), forward_deduped(controller, rx, &sink, &mut seen));
    Ok(())
}

pub async fn run_censys(controller: &ScanController, http: &reqwest::Client, sink: mpsc::UnboundedSender<Candidate>) -> anyhow::Result<()> {
    let api_id = std::env::var("CENSYS_API_ID").map_err(|_| anyhow::anyhow!("CENSYS_API_ID is not set"))?;
    let api_secret = std::env::var("CENSYS_API_SECRET").map_err(|_| anyhow::anyhow!("CENSYS_API_SECRET is not set"))?;
    let (tx, rx) = mpsc::unbounded_channel();
    let mut seen = HashSet::new();
    tokio::join!(search_api_2::run(http, &api_id, &api_secret, tx), forward_deduped(controller, rx, &sink, &mut seen));
    Ok(())
}

pub async fn run_masscan(controller: &ScanController, path: &std::path::Path, sink: mpsc::UnboundedSender<Candidate>) -> anyhow::Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut seen = HashSet::new();
    let path_owned = path.to_path_buf();
    let (parse_result, ()) = tokio::join!(
        async move { port_scan_file::run(&path_owned, tx).await },
        forward_deduped(controller, rx, &sink, &mut seen)
    );
    match parse_result {
        Ok(()) => Ok(()),
        Err(error @ DiscoverySourceError::Io(_)) => Err(anyhow::anyhow!("reading scan file: {error}")),
        Err(other) => {
            warn!("masscan source error: {other}");
            Ok(())
        }
    }
}
