use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use tracing::info;

use leasecheck_common::config::EngineConfig;
use leasecheck_core::runner::{CatalogRunner, RunSummary};
use leasecheck_core::system::Capabilities;

use crate::commands::RunArgs;
use crate::terminal::{colors, format, print};

pub async fn run(args: RunArgs, mut cfg: EngineConfig, quiet: u8) -> anyhow::Result<ExitCode> {
    if let Some(interface) = &args.interface {
        cfg.default_interface = interface.clone();
    }

    let mut catalog = args.catalog.load(&cfg).context("loading scenario catalog")?;
    catalog.retain_only(&args.only)?;
    cfg.apply(catalog.settings());
    apply_overrides(&args, &mut cfg);
    cfg.validate().context("invalid configuration")?;

    info!(
        "Running {} scenario(s), {} observation attempt(s) {:?} apart",
        catalog.scenarios().len(),
        cfg.retry.attempts,
        cfg.retry.backoff
    );

    let mut runner = CatalogRunner::from_config(&cfg, Capabilities::host(&cfg));
    let start_time = Instant::now();
    let mut idx = 0;
    let summary = runner
        .run_with(catalog.scenarios(), |result| {
            if quiet == 0 || (quiet == 1 && !result.passed()) {
                format::print_result(idx, result);
            }
            idx += 1;
        })
        .await;

    print_summary(&summary, start_time.elapsed());

    Ok(if summary.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn apply_overrides(args: &RunArgs, cfg: &mut EngineConfig) {
    if let Some(attempts) = args.attempts {
        cfg.retry.attempts = attempts;
    }
    if let Some(ms) = args.backoff_ms {
        cfg.retry.backoff = Duration::from_millis(ms);
    }
    if let Some(secs) = args.lease_timeout {
        cfg.lease_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.scenario_timeout {
        cfg.scenario_timeout = Duration::from_secs(secs);
    }
}

fn print_summary(summary: &RunSummary, total_time: Duration) {
    let passed: ColoredString = format!("{} passed", summary.passed()).color(colors::PASS).bold();
    let failed: ColoredString = if summary.failed() > 0 {
        format!("{} failed", summary.failed()).color(colors::FAIL).bold()
    } else {
        format!("{} failed", summary.failed()).color(colors::TEXT_DEFAULT)
    };
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();

    print::fat_separator();
    print::centerln(&format!("Run complete: {passed}, {failed} in {total_time}"));
}
