use async_trait::async_trait;
use tracing::debug;

use leasecheck_common::error::CapabilityError;
use leasecheck_common::system::{DhcpClient, LeaseOutcome};

use super::command::CommandRunner;

/// `dhclient -1` exits with this status when no lease could be obtained.
const NO_LEASE_EXIT_CODE: i32 = 2;

/// ISC dhclient driven in one-shot mode.
pub struct Dhclient {
    runner: CommandRunner,
}

impl Dhclient {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl DhcpClient for Dhclient {
    async fn release(&self, interface: &str) -> Result<(), CapabilityError> {
        let output = self.runner.output("dhclient", &["-r", interface]).await?;
        if output.status.success() {
            return Ok(());
        }
        if holds_no_lease(&output.stderr) {
            debug!(interface, "no lease to release");
            return Err(CapabilityError::Absent);
        }
        Err(output.into_failure())
    }

    async fn request_lease(&self, interface: &str) -> Result<LeaseOutcome, CapabilityError> {
        let output = self.runner.output("dhclient", &["-1", interface]).await?;
        match output.status.code() {
            Some(0) => Ok(LeaseOutcome::Acquired),
            Some(NO_LEASE_EXIT_CODE) => Ok(LeaseOutcome::TimedOut),
            _ => Err(output.into_failure()),
        }
    }
}

/// A release without a running client or lease database is a no-op.
fn holds_no_lease(stderr: &str) -> bool {
    let stderr = stderr.to_ascii_lowercase();
    stderr.contains("no lease") || stderr.contains("no such process") || stderr.contains("not running")
}
