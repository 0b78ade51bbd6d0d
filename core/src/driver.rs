//! Forces a fresh DHCP negotiation on an interface.
//!
//! Steps run in a fixed order and the first failing step aborts the cycle:
//! optional default route deletion, link address, link up, lease release,
//! lease request. The link must carry the scenario's MAC and be up before any
//! lease operation, and the release has to precede the request so the server
//! allocates afresh instead of the client reusing a cached lease.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use leasecheck_common::error::{CapabilityError, ConvergenceError, ConvergenceStep};
use leasecheck_common::network::interface::InterfaceIdentity;
use leasecheck_common::system::{DhcpClient, LeaseOutcome, LinkControl};

#[derive(Clone)]
pub struct ConvergenceDriver {
    link: Arc<dyn LinkControl>,
    dhcp: Arc<dyn DhcpClient>,
    lease_timeout: Duration,
}

impl ConvergenceDriver {
    pub fn new(
        link: Arc<dyn LinkControl>,
        dhcp: Arc<dyn DhcpClient>,
        lease_timeout: Duration,
    ) -> Self {
        Self {
            link,
            dhcp,
            lease_timeout,
        }
    }

    pub async fn converge(
        &self,
        identity: &InterfaceIdentity,
        reset_default_route: bool,
    ) -> Result<(), ConvergenceError> {
        let interface = identity.name.as_str();

        if reset_default_route {
            debug!("deleting default route");
            tolerate_absent(self.link.delete_default_route().await)
                .map_err(at(ConvergenceStep::DeleteDefaultRoute))?;
        }

        debug!(interface, mac = %identity.mac, "setting link address");
        self.link
            .set_link_address(interface, identity.mac)
            .await
            .map_err(at(ConvergenceStep::SetLinkAddress))?;

        debug!(interface, "bringing link up");
        self.link
            .set_link_up(interface)
            .await
            .map_err(at(ConvergenceStep::SetLinkUp))?;

        debug!(interface, "releasing lease");
        tolerate_absent(self.dhcp.release(interface).await)
            .map_err(at(ConvergenceStep::ReleaseLease))?;

        debug!(interface, timeout = ?self.lease_timeout, "requesting lease");
        self.request_lease(interface)
            .await
            .map_err(at(ConvergenceStep::RequestLease))?;

        info!(interface, "lease negotiated");
        Ok(())
    }

    async fn request_lease(&self, interface: &str) -> Result<(), CapabilityError> {
        let timed_out = || CapabilityError::TimedOut {
            operation: format!("lease request on {interface}"),
            timeout: self.lease_timeout,
        };

        match tokio::time::timeout(self.lease_timeout, self.dhcp.request_lease(interface)).await {
            Ok(Ok(LeaseOutcome::Acquired)) => Ok(()),
            Ok(Ok(LeaseOutcome::TimedOut)) | Err(_) => Err(timed_out()),
            Ok(Err(err)) => Err(err),
        }
    }
}

fn at(step: ConvergenceStep) -> impl FnOnce(CapabilityError) -> ConvergenceError {
    move |cause| ConvergenceError::new(step, cause)
}

/// Nothing to delete or release counts as done.
fn tolerate_absent(result: Result<(), CapabilityError>) -> Result<(), CapabilityError> {
    match result {
        Err(CapabilityError::Absent) => Ok(()),
        other => other,
    }
}
