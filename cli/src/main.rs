mod commands;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, Commands, list, observe, resolve, run};
use leasecheck_common::config::EngineConfig;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    print::banner(commands.quiet);

    let cfg = EngineConfig {
        elevate: !commands.no_sudo && !is_root::is_root(),
        ..EngineConfig::default()
    };

    match commands.command {
        Commands::Run(args) => {
            print::header("verifying lease convergence", commands.quiet);
            run::run(args, cfg, commands.quiet).await
        }
        Commands::List { catalog } => {
            print::header("scenario catalog", commands.quiet);
            list::list(&catalog, &cfg)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Observe { interface } => {
            print::header("observed network state", commands.quiet);
            observe::observe(&interface, &cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Resolve { hostname } => {
            print::header("hostname resolution", commands.quiet);
            resolve::resolve(&hostname, &cfg).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
