// [apps/scanner/src/controller.rs]
/*!
 * =================================================================
 * APARATO: SCAN CONTROLLER
 * CLASIFICACIÓN: APPLICATION LAYER (ESTRATO L2)
 * RESPONSABILIDAD: POOL DE TRABAJADORES ACOTADO SOBRE UN STREAM DE CANDIDATOS
 *
 * Homogeneous workers pop a Candidate, try its ports in priority order,
 * stop at the first Valid verdict, and move on. Pause/shutdown are two
 * process-wide signals every worker consults at each iteration (spec
 * §4.6), the same cooperative-control shape as the miner's operational
 * signal.
 * =================================================================
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use prospector_discovery_sources::Candidate;
use prospector_verifier::{ScanStatus, Verifier, VerdictKind};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::ports;

const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(200);
const DRAIN_GRACE_PERIOD: Duration = Duration::from_secs(10);
const DEFAULT_DYNAMIC_SCAN_WALL_CLOCK_CAP: Duration = Duration::from_secs(60);
const DEFAULT_DYNAMIC_PORT_PROBE_CAP: usize = 100;
const PROGRESS_TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct Counters {
    pub completed: u64,
    pub valid: u64,
    pub invalid: u64,
    pub errors: u64,
    pub duplicates: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CandidateOutcome {
    Valid,
    Invalid,
    Error,
}

/// Cooperative pause/shutdown signals every worker polls at each loop
/// iteration and every blocking boundary (spec §4.6).
#[derive(Default)]
pub struct ScanSignals {
    paused: AtomicBool,
    running: AtomicBool,
}

impl ScanSignals {
    pub fn new() -> Arc<Self> {
        Arc::new(Self { paused: AtomicBool::new(false), running: AtomicBool::new(true) })
    }

    pub fn toggle_pause(&self) {
        let now_paused = !self.paused.load(Ordering::SeqCst);
        self.paused.store(now_paused, Ordering::SeqCst);
        if now_paused {
            warn!("scan paused");
        } else {
            info!("scan resumed");
        }
    }

    pub fn request_shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn wait_while_paused(&self) {
        while self.paused.load(Ordering::SeqCst) && self.running.load(Ordering::SeqCst) {
            tokio::time::sleep(PAUSE_POLL_INTERVAL).await;
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanControllerConfig {
    pub worker_count: usize,
    pub per_port_timeout: Duration,
    pub preserve_verified: bool,
    pub dynamic_ports_enabled: bool,
    pub dynamic_port_limit: usize,
    pub dynamic_port_wall_clock_cap: Duration,
}

impl Default for ScanControllerConfig {
    fn default() -> Self {
        Self {
            worker_count: 50,
            per_port_timeout: Duration::from_secs(10),
            preserve_verified: false,
            dynamic_ports_enabled: true,
            dynamic_port_limit: DEFAULT_DYNAMIC_PORT_PROBE_CAP,
            dynamic_port_wall_clock_cap: DEFAULT_DYNAMIC_SCAN_WALL_CLOCK_CAP,
        }
    }
}

pub struct ScanController {
    verifier: Arc<Verifier>,
    signals: Arc<ScanSignals>,
    counters: Arc<std::sync::Mutex<Counters>>,
    config: ScanControllerConfig,
}

impl ScanController {
    pub fn new(verifier: Arc<Verifier>, signals: Arc<ScanSignals>, config: ScanControllerConfig) -> Self {
        Self { verifier, signals, counters: Arc::new(std::sync::Mutex::new(Counters::default())), config }
    }

    /// Called by the candidate intake loop when it drops a candidate it
    /// has already seen this run, before the candidate ever reaches a
    /// worker.
    pub fn record_duplicate(&self) {
        let mut guard = self.counters.lock().expect("counters mutex poisoned");
        guard.duplicates += 1;
    }

    pub fn counters_snapshot(&self) -> Counters {
        let guard = self.counters.lock().expect("counters mutex poisoned");
        Counters {
            completed: guard.completed,
            valid: guard.valid,
            invalid: guard.invalid,
            errors: guard.errors,
            duplicates: guard.duplicates,
        }
    }

    /// Caps `requested` by `max_connections - headroom`, logging a warning
    /// if it had to reduce it (spec §4.6).
    pub fn resolve_worker_count(requested: usize, max_connections: u32, headroom: u32) -> usize {
        let cap = max_connections.saturating_sub(headroom).max(1) as usize;
        if requested > cap {
            warn!("requested worker count {} exceeds pool headroom, reducing to {}", requested, cap);
            cap
        } else {
            requested
        }
    }

    /// Spawns a background ticker that renders completed/valid/invalid/
    /// errors/duplicates plus an ETA against `expected_total`, when known.
    /// Runs until `signals` reports shutdown.
    pub fn spawn_progress_reporter(&self, expected_total: Option<u64>) -> tokio::task::JoinHandle<()> {
        let counters = Arc::clone(&self.counters);
        let signals = Arc::clone(&self.signals);

        let bar = match expected_total {
            Some(total) => ProgressBar::new(total),
            None => ProgressBar::new_spinner(),
        };
        if let Some(style) = progress_style(expected_total.is_some()) {
            bar.set_style(style);
        }

        tokio::spawn(async move {
            loop {
                let (completed, valid, invalid, errors, duplicates) = {
                    let guard = counters.lock().expect("counters mutex poisoned");
                    (guard.completed, guard.valid, guard.invalid, guard.errors, guard.duplicates)
                };
                bar.set_position(completed);
                bar.set_message(format!("valid={valid} invalid={invalid} errors={errors} duplicates={duplicates}"));

                if !signals.is_running() {
                    break;
                }
                tokio::time::sleep(PROGRESS_TICK_INTERVAL).await;
            }
            bar.finish_and_clear();
        })
    }

    /// Drains `candidates` through the worker pool until the channel
    /// closes or a shutdown is requested. A 10-second grace period lets
    /// in-flight probes finish before the process exits regardless (spec
    /// §4.6).
    #[instrument(skip(self, candidates))]
    pub async fn run(&self, candidates: mpsc::UnboundedReceiver<Candidate>) {
        let shared_receiver = Arc::new(Mutex::new(candidates));
        let mut handles = Vec::with_capacity(self.config.worker_count);

        for worker_id in 0..self.config.worker_count {
            let receiver = Arc::clone(&shared_receiver);
            let verifier = Arc::clone(&self.verifier);
            let signals = Arc::clone(&self.signals);
            let counters = Arc::clone(&self.counters);
            let config = self.config.clone();

            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, receiver, verifier, signals, counters, config).await;
            }));
        }

        for handle in handles {
            let _ = handle.await;
        }

        if !self.signals.is_running() {
            info!("shutdown requested; draining for up to {:?}", DRAIN_GRACE_PERIOD);
            tokio::time::sleep(DRAIN_GRACE_PERIOD).await;
        }
    }
}

fn progress_style(bounded: bool) -> Option<ProgressStyle> {
    let template = if bounded {
        "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} (eta {eta}) {msg}"
    } else {
        "{spinner} [{elapsed_precise}] {pos} processed {msg}"
    };
    ProgressStyle::with_template(template).ok()
}

async fn worker_loop(
    worker_id: usize,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Candidate>>>,
    verifier: Arc<Verifier>,
    signals: Arc<ScanSignals>,
    counters: Arc<std::sync::Mutex<Counters>>,
    config: ScanControllerConfig,
) {
    loop {
        signals.wait_while_paused().await;
        if !signals.is_running() {
            break;
        }

        let candidate = {
            let mut guard = receiver.lock().await;
            guard.recv().await
        };

        let Some(candidate) = candidate else { break };

        let outcome = process_candidate(worker_id, &candidate, &verifier, &signals, &config).await;

        let mut guard = counters.lock().expect("counters mutex poisoned");
        guard.completed += 1;
        match outcome {
            CandidateOutcome::Valid => guard.valid += 1,
            CandidateOutcome::Invalid => guard.invalid += 1,
            CandidateOutcome::Error => guard.errors += 1,
        }
    }

    debug!("worker {} exiting", worker_id);
}

async fn process_candidate(
    worker_id: usize,
    candidate: &Candidate,
    verifier: &Verifier,
    signals: &ScanSignals,
    config: &ScanControllerConfig,
) -> CandidateOutcome {
    let additional = candidate.additional_ports.clone().unwrap_or_default();
    let dynamic_allowed = config.dynamic_ports_enabled && candidate.promising;
    let ports = ports::ports_to_try(candidate.primary_port, &additional, candidate.promising, dynamic_allowed, config.dynamic_port_limit);
    let fixed_count = ports::fixed_port_count(candidate.primary_port, &additional);

    // The wall-clock cap scopes only the dynamic-port exploration tail of
    // `ports`; it starts ticking once the loop reaches that segment, not
    // at the top of the fixed-port attempts.
    let mut deadline = None;
    let mut saw_error = false;

    for (index, port) in ports.into_iter().enumerate() {
        if !signals.is_running() {
            return CandidateOutcome::Invalid;
        }
        if dynamic_allowed && index == fixed_count {
            deadline = Some(Instant::now() + config.dynamic_port_wall_clock_cap);
        }
        if let Some(deadline) = deadline {
            if Instant::now() > deadline {
                debug!("worker {} hit dynamic-port wall-clock cap for {}", worker_id, candidate.ip);
                break;
            }
        }

        let outcome = verifier.verify(&candidate.ip, port, ScanStatus::Unverified, config.preserve_verified).await;

        match outcome {
            Ok(result) if result.verdict_kind == VerdictKind::Valid => {
                debug!("worker {} found a valid endpoint at {}:{}", worker_id, candidate.ip, port);
                return CandidateOutcome::Valid;
            }
            Ok(_) => continue,
            Err(error) => {
                warn!("worker {} verify error for {}:{}: {}", worker_id, candidate.ip, port, error);
                saw_error = true;
                continue;
            }
        }
    }

    if saw_error {
        CandidateOutcome::Error
    } else {
        CandidateOutcome::Invalid
    }
}
