//! Reads the live network state back from the host.
//!
//! No retries happen here. Convergence timing is the verifier's concern.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::debug;

use leasecheck_common::error::{ObserveError, ResolveError};
use leasecheck_common::network::state::ObservedNetworkState;
use leasecheck_common::system::{HostResolver, NetworkIntrospection};

#[derive(Clone)]
pub struct StateObserver {
    introspection: Arc<dyn NetworkIntrospection>,
    resolver: Arc<dyn HostResolver>,
}

impl StateObserver {
    pub fn new(
        introspection: Arc<dyn NetworkIntrospection>,
        resolver: Arc<dyn HostResolver>,
    ) -> Self {
        Self {
            introspection,
            resolver,
        }
    }

    /// Takes one snapshot of `interface`.
    ///
    /// Fails with [`ObserveError::InterfaceNotFound`] while the interface has
    /// no IPv4 address, which is also what a not yet converged lease looks like.
    pub async fn observe(&self, interface: &str) -> Result<ObservedNetworkState, ObserveError> {
        let assigned = self
            .introspection
            .interface_ipv4(interface)
            .await?
            .ok_or_else(|| ObserveError::InterfaceNotFound {
                interface: interface.to_string(),
            })?;
        let gateways = self.introspection.default_gateways().await?;
        let resolvers = self.introspection.configured_resolvers().await?;

        debug!(
            interface,
            address = %assigned.address,
            netmask = %assigned.netmask,
            gateways = ?gateways,
            resolvers = ?resolvers,
            "observed network state"
        );

        Ok(ObservedNetworkState {
            interface: interface.to_string(),
            address: assigned.address,
            netmask: assigned.netmask,
            gateways,
            resolvers,
        })
    }

    pub async fn resolve_hostname(&self, hostname: &str) -> Result<Ipv4Addr, ResolveError> {
        match self.resolver.resolve(hostname).await {
            Ok(Some(address)) => {
                debug!(hostname, %address, "resolved hostname");
                Ok(address)
            }
            Ok(None) => Err(ResolveError::ResolutionFailed {
                hostname: hostname.to_string(),
            }),
            Err(cause) => Err(ResolveError::Lookup {
                hostname: hostname.to_string(),
                cause,
            }),
        }
    }
}
