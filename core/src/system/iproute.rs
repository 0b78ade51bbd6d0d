use async_trait::async_trait;
use pnet::util::MacAddr;
use tracing::debug;

use leasecheck_common::error::CapabilityError;
use leasecheck_common::system::LinkControl;

use super::command::CommandRunner;

/// Link control through iproute2.
pub struct IpRoute {
    runner: CommandRunner,
}

impl IpRoute {
    pub fn new(runner: CommandRunner) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl LinkControl for IpRoute {
    async fn set_link_address(&self, interface: &str, mac: MacAddr) -> Result<(), CapabilityError> {
        let mac = mac.to_string();
        self.runner
            .run("ip", &["link", "set", "dev", interface, "address", mac.as_str()])
            .await?;
        Ok(())
    }

    async fn set_link_up(&self, interface: &str) -> Result<(), CapabilityError> {
        self.runner
            .run("ip", &["link", "set", "dev", interface, "up"])
            .await?;
        Ok(())
    }

    async fn delete_default_route(&self) -> Result<(), CapabilityError> {
        let output = self.runner.output("ip", &["route", "del", "default"]).await?;
        if output.status.success() {
            return Ok(());
        }
        if is_missing_route(&output.stderr) {
            debug!("no default route to delete");
            return Err(CapabilityError::Absent);
        }
        Err(output.into_failure())
    }
}

/// `RTNETLINK answers: No such process` is what iproute2 prints when the
/// route does not exist.
fn is_missing_route(stderr: &str) -> bool {
    stderr.contains("No such process") || stderr.contains("No such file or directory")
}
