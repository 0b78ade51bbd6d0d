pub mod list;
pub mod observe;
pub mod resolve;
pub mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use leasecheck_common::config::EngineConfig;
use leasecheck_core::catalog::{Catalog, CatalogError};

#[derive(Parser)]
#[command(name = "leasecheck")]
#[command(about = "Verifies that DHCP leases converge to the expected network state.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output (-q hides banner and passing scenarios, -qq prints the summary only)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Never prefix privileged commands with sudo
    #[arg(long, global = true)]
    pub no_sudo: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Converge and verify every scenario of a catalog
    #[command(alias = "r")]
    Run(RunArgs),
    /// Show the scenarios of a catalog and what they expect
    #[command(alias = "l")]
    List {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Print the current network state of an interface
    #[command(alias = "o")]
    Observe { interface: String },
    /// Resolve a hostname through the system resolver
    #[command(alias = "d")]
    Resolve { hostname: String },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct CatalogArgs {
    /// Catalog file describing networks and scenarios
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,
    /// One of the catalogs shipped with leasecheck
    #[arg(long, value_name = "NAME")]
    pub builtin: Option<String>,
}

impl CatalogArgs {
    pub fn load(&self, cfg: &EngineConfig) -> Result<Catalog, CatalogError> {
        match (&self.catalog, &self.builtin) {
            (Some(path), _) => Catalog::load(path, cfg),
            (None, Some(name)) => Catalog::builtin(name, cfg),
            (None, None) => Catalog::builtin("basic", cfg),
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub catalog: CatalogArgs,
    /// Run only the named scenario (repeatable)
    #[arg(long, value_name = "SCENARIO")]
    pub only: Vec<String>,
    /// Interface for scenarios that do not name one
    #[arg(long, short = 'i')]
    pub interface: Option<String>,
    /// Observation attempts after a lease request
    #[arg(long)]
    pub attempts: Option<u32>,
    /// Delay between observation attempts in milliseconds
    #[arg(long, value_name = "MS")]
    pub backoff_ms: Option<u64>,
    /// Upper bound for one lease request in seconds
    #[arg(long, value_name = "SECS")]
    pub lease_timeout: Option<u64>,
    /// Upper bound for one scenario in seconds
    #[arg(long, value_name = "SECS")]
    pub scenario_timeout: Option<u64>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
