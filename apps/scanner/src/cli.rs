// [apps/scanner/src/cli.rs]
/*!
 * Operator-facing command surface (spec §4.6). `menu` is the historical
 * interactive default; the other subcommands are the scriptable paths
 * CI and cron jobs actually use.
 */

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "scanner",
    version,
    about = "Discovers, probes, and classifies open inference endpoints"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Worker pool size; capped by the store's max_connections headroom.
    #[arg(long, global = true, default_value_t = 50)]
    pub threads: usize,

    /// Stop after this many candidates have been processed (0 = unbounded).
    #[arg(long, global = true, default_value_t = 0)]
    pub limit: usize,

    /// Per-port probe timeout in seconds.
    #[arg(long, global = true, default_value_t = 10)]
    pub timeout: u64,

    /// Disable dynamic-port sampling for promising candidates.
    #[arg(long, global = true, default_value_t = false)]
    pub no_dynamic_ports: bool,

    /// Maximum number of dynamic ports sampled per promising candidate.
    #[arg(long, global = true, default_value_t = 100)]
    pub dynamic_port_limit: usize,

    /// Wall-clock cap in seconds for a candidate's dynamic-port sampling.
    #[arg(long, global = true, default_value_t = 60)]
    pub dynamic_port_timeout: u64,

    /// Verbose (debug-level) logging.
    #[arg(long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Never downgrade an endpoint already marked verified during this run.
    #[arg(long, global = true, default_value_t = false)]
    pub preserve_verified: bool,

    /// Discovery-time verification hint applied to fresh candidates.
    #[arg(long, global = true, value_enum, default_value_t = StatusArg::Unverified)]
    pub status: StatusArg,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusArg {
    Verified,
    Unverified,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (historical default entry point).
    Menu,
    /// Read masscan/nmap grepable output from a file and scan its hosts.
    Masscan {
        /// Path to the grepable-format scan results file.
        path: std::path::PathBuf,
    },
    /// Pull candidates from the first search API and scan them.
    Shodan,
    /// Pull candidates from the second search API and scan them.
    Censys,
    /// Re-verify every endpoint already on file, in case status drifted.
    Reassign,
    /// Probe a single host:port pair and print the verdict.
    Check {
        ip: String,
        port: u16,
    },
}
