// [apps/scanner/src/main.rs]
/*!
 * Thin entry point: parse CLI, ignite the kernel, dispatch to the
 * requested subcommand, exit non-zero on any fatal configuration or
 * database error (spec §4.6).
 */

use anyhow::Result;
use clap::Parser;
use prospector_discovery_sources::Candidate;
use prospector_scanner_lib::bootstrap::Bootstrap;
use prospector_scanner_lib::cli::{Cli, Commands};
use prospector_scanner_lib::{bootstrap, intake};
use prospector_verifier::{ScanStatus, Verifier};
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let kernel = bootstrap::ignite(&cli).await?;

    let result = match &cli.command {
        Commands::Menu => run_menu().await,
        Commands::Masscan { path } => run_masscan(&kernel, path).await,
        Commands::Shodan => run_shodan(&kernel).await,
        Commands::Censys => run_censys(&kernel).await,
        Commands::Reassign => run_reassign(&kernel).await,
        Commands::Check { ip, port } => run_check(&kernel, ip, *port).await,
    };

    if let Err(error) = &result {
        error!("scanner exited with error: {error}");
    }
    result
}

async fn run_menu() -> Result<()> {
    println!("Interactive menu is not available in non-terminal sessions; use one of: masscan, shodan, censys, reassign, check.");
    Ok(())
}

/// Drives the controller to drain `rx`, rendering a progress bar against
/// `expected_total` (if known) and reporting final counters once the
/// channel closes naturally.
async fn drain_with_progress(kernel: &Bootstrap, rx: mpsc::UnboundedReceiver<Candidate>, expected_total: Option<u64>) {
    let progress_handle = kernel.controller.spawn_progress_reporter(expected_total);
    kernel.controller.run(rx).await;
    kernel.signals.request_shutdown();
    let _ = progress_handle.await;
    report_counters(kernel);
}

async fn run_masscan(kernel: &Bootstrap, path: &std::path::Path) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = kernel.controller.clone();
    let path = path.to_path_buf();
    let intake_handle = tokio::spawn(async move { intake::run_masscan(&controller, &path, tx).await });
    drain_with_progress(kernel, rx, None).await;
    intake_handle.await??;
    Ok(())
}

async fn run_shodan(kernel: &Bootstrap) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = kernel.controller.clone();
    let http = kernel.http.clone();
    let intake_handle = tokio::spawn(async move { intake::run_shodan(&controller, &http, tx).await });
    drain_with_progress(kernel, rx, None).await;
    intake_handle.await??;
    Ok(())
}

async fn run_censys(kernel: &Bootstrap) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = kernel.controller.clone();
    let http = kernel.http.clone();
    let intake_handle = tokio::spawn(async move { intake::run_censys(&controller, &http, tx).await });
    drain_with_progress(kernel, rx, None).await;
    intake_handle.await??;
    Ok(())
}

async fn run_reassign(kernel: &Bootstrap) -> Result<()> {
    let rows = prospector_query_service::list_endpoints(&kernel.store, Default::default()).await?;
    info!("re-verifying {} known endpoints", rows.len());
    let expected_total = rows.len() as u64;

    let (tx, rx) = mpsc::unbounded_channel();
    for row in &rows {
        let candidate = Candidate::new(row.ip.clone(), row.port as u16, false);
        if tx.send(candidate).is_err() {
            break;
        }
    }
    drop(tx);
    drain_with_progress(kernel, rx, Some(expected_total)).await;
    Ok(())
}

async fn run_check(kernel: &Bootstrap, ip: &str, port: u16) -> Result<()> {
    let verifier = Verifier::new(kernel.store.clone(), prospector_probe_client::ProbeClient::new());
    let outcome = verifier.verify(ip, port, ScanStatus::Unverified, false).await?;
    println!("{ip}:{port} -> {:?} ({})", outcome.verdict_kind, outcome.reason.unwrap_or_default());
    Ok(())
}

fn report_counters(kernel: &Bootstrap) {
    let counters = kernel.controller.counters_snapshot();
    info!(
        "done: completed={} valid={} invalid={} errors={} duplicates={}",
        counters.completed, counters.valid, counters.invalid, counters.errors, counters.duplicates
    );
}
