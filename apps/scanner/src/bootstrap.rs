// [apps/scanner/src/bootstrap.rs]
/*!
 * Kernel ignition: telemetry, config, and every domain object the
 * controller and its candidate intake loops need, wired once at process
 * start (mirrors the teacher's worker-shell bootstrap step).
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use prospector_catalog_store::{CatalogStore, DbConfig};
use prospector_probe_client::ProbeClient;
use prospector_verifier::Verifier;

use crate::controller::{ScanController, ScanControllerConfig, ScanSignals};

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

pub struct Bootstrap {
    pub store: CatalogStore,
    pub controller: Arc<ScanController>,
    pub signals: Arc<ScanSignals>,
    pub http: reqwest::Client,
}

pub async fn ignite(cli: &crate::cli::Cli) -> Result<Bootstrap> {
    prospector_telemetry::init_tracing("scanner");

    let db_config = DbConfig::from_env().context("reading database configuration from the environment")?;
    let max_connections = db_config.max_connections;
    let store = CatalogStore::connect(db_config).await.context("connecting to the catalog store")?;

    let probe_client = ProbeClient::new();
    let verifier = Arc::new(Verifier::new(store.clone(), probe_client));

    let signals = ScanSignals::new();
    let worker_count = ScanController::resolve_worker_count(cli.threads, max_connections, 5);
    tracing::debug!("starting {} workers on a {}-core host", worker_count, num_cpus::get());

    let controller_config = ScanControllerConfig {
        worker_count,
        per_port_timeout: Duration::from_secs(cli.timeout),
        preserve_verified: cli.preserve_verified,
        dynamic_ports_enabled: !cli.no_dynamic_ports,
        dynamic_port_limit: cli.dynamic_port_limit,
        dynamic_port_wall_clock_cap: Duration::from_secs(cli.dynamic_port_timeout),
    };

    let controller = Arc::new(ScanController::new(Arc::clone(&verifier), Arc::clone(&signals), controller_config));

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("building the discovery-source HTTP client")?;

    install_signal_handlers(Arc::clone(&signals));
    spawn_keep_alive(store.clone(), Arc::clone(&signals));

    Ok(Bootstrap { store, controller, signals, http })
}

/// Periodically probes the pool so a degraded Postgres connection is
/// self-healed ahead of the next real query (SPEC_FULL §C), rather than
/// only discovered when an `exec`/`fetch_one`/`transaction` call fails.
fn spawn_keep_alive(store: CatalogStore, signals: Arc<ScanSignals>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(KEEP_ALIVE_INTERVAL);
        interval.tick().await; // first tick fires immediately; skip it
        while signals.is_running() {
            interval.tick().await;
            if !signals.is_running() {
                break;
            }
            if let Err(error) = store.keep_alive().await {
                tracing::warn!("keep_alive failed: {error}");
            }
        }
    });
}

/// Ctrl-C toggles pause; a second distinct signal (SIGTERM, or a second
/// Ctrl-C within one second) requests shutdown. Mirrors the teacher's
/// `Arc<AtomicBool>` termination-signal idiom.
fn install_signal_handlers(signals: Arc<ScanSignals>) {
    let pause_signals = Arc::clone(&signals);
    let last_interrupt = Arc::new(std::sync::Mutex::new(None::<std::time::Instant>));

    ctrlc::set_handler(move || {
        let mut guard = last_interrupt.lock().expect("interrupt-timestamp mutex poisoned");
        let now = std::time::Instant::now();
        if let Some(previous) = *guard {
            if now.duration_since(previous) < Duration::from_secs(1) {
                pause_signals.request_shutdown();
                return;
            }
        }
        *guard = Some(now);
        pause_signals.toggle_pause();
    })
    .expect("failed to install the Ctrl-C handler");
}
