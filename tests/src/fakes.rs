//! A simulated host with a DHCP server that binds addresses by MAC.
//!
//! The host implements all four capabilities, so a runner built on it goes
//! through the real driver, observer and verifier code paths.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use pnet::util::MacAddr;

use leasecheck_common::config::{EngineConfig, RetryPolicy};
use leasecheck_common::error::CapabilityError;
use leasecheck_common::network::state::InterfaceAddress;
use leasecheck_common::system::{
    DhcpClient, HostResolver, LeaseOutcome, LinkControl, NetworkIntrospection,
};
use leasecheck_core::runner::CatalogRunner;
use leasecheck_core::system::Capabilities;

/// What the server hands out to one MAC.
#[derive(Debug, Clone, Copy)]
pub struct Allocation {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub nameserver: Ipv4Addr,
}

impl Allocation {
    pub fn new(address: Ipv4Addr, prefix: u8, gateway: Ipv4Addr) -> Self {
        let netmask = Ipv4Addr::from(u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0));
        Self {
            address,
            netmask,
            gateway,
            nameserver: gateway,
        }
    }
}

#[derive(Default)]
struct HostState {
    bindings: HashMap<MacAddr, Allocation>,
    link_macs: HashMap<String, MacAddr>,
    links_up: HashSet<String>,
    leases: HashMap<String, Allocation>,
    default_routes: BTreeSet<Ipv4Addr>,
    static_resolvers: Vec<IpAddr>,
    lease_resolvers: Vec<IpAddr>,
    hosts: HashMap<String, Ipv4Addr>,
    convergence_lag: u32,
    hidden_polls: u32,
    polls: u32,
    hang_requests: bool,
    broken_links: HashSet<String>,
    log: Vec<String>,
}

#[derive(Default)]
pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state.lock().unwrap()
    }

    /// Statically binds `mac` to an allocation on the DHCP server.
    pub fn bind(&self, mac: &str, allocation: Allocation) -> &Self {
        let mac: MacAddr = mac.parse().unwrap();
        self.state().bindings.insert(mac, allocation);
        self
    }

    pub fn add_host(&self, hostname: &str, address: Ipv4Addr) -> &Self {
        self.state().hosts.insert(hostname.to_string(), address);
        self
    }

    /// A default route that exists independently of any lease.
    pub fn add_default_route(&self, gateway: Ipv4Addr) -> &Self {
        self.state().default_routes.insert(gateway);
        self
    }

    /// A resolver that stays configured across leases, listed first.
    pub fn add_static_resolver(&self, resolver: IpAddr) -> &Self {
        self.state().static_resolvers.push(resolver);
        self
    }

    /// Number of observations that still miss the address after a lease.
    pub fn set_convergence_lag(&self, polls: u32) -> &Self {
        self.state().convergence_lag = polls;
        self
    }

    pub fn hang_lease_requests(&self) -> &Self {
        self.state().hang_requests = true;
        self
    }

    pub fn break_link(&self, interface: &str) -> &Self {
        self.state().broken_links.insert(interface.to_string());
        self
    }

    pub fn log(&self) -> Vec<String> {
        self.state().log.clone()
    }

    pub fn polls(&self) -> u32 {
        self.state().polls
    }

    pub fn default_routes(&self) -> BTreeSet<Ipv4Addr> {
        self.state().default_routes.clone()
    }

    pub fn capabilities(self: &Arc<Self>) -> Capabilities {
        Capabilities {
            link: self.clone(),
            dhcp: self.clone(),
            introspection: self.clone(),
            resolver: self.clone(),
        }
    }
}

/// Engine configuration with a tight polling budget.
pub fn fast_config(attempts: u32) -> EngineConfig {
    EngineConfig {
        retry: RetryPolicy {
            attempts,
            backoff: Duration::from_millis(1),
        },
        lease_timeout: Duration::from_secs(5),
        scenario_timeout: Duration::from_secs(10),
        ..EngineConfig::default()
    }
}

pub fn runner(host: &Arc<FakeHost>, cfg: &EngineConfig) -> CatalogRunner {
    CatalogRunner::from_config(cfg, host.capabilities())
}

#[async_trait]
impl LinkControl for FakeHost {
    async fn set_link_address(&self, interface: &str, mac: MacAddr) -> Result<(), CapabilityError> {
        let mut state = self.state();
        state.log.push(format!("link addr {interface} {mac}"));
        if state.broken_links.contains(interface) {
            return Err(CapabilityError::CommandFailed {
                command: format!("ip link set dev {interface} address {mac}"),
                status: "exit status: 1".into(),
                stderr: format!("Cannot find device \"{interface}\""),
            });
        }
        state.link_macs.insert(interface.to_string(), mac);
        Ok(())
    }

    async fn set_link_up(&self, interface: &str) -> Result<(), CapabilityError> {
        let mut state = self.state();
        state.log.push(format!("link up {interface}"));
        state.links_up.insert(interface.to_string());
        Ok(())
    }

    async fn delete_default_route(&self) -> Result<(), CapabilityError> {
        let mut state = self.state();
        state.log.push("route del default".to_string());
        match state.default_routes.iter().next().copied() {
            Some(gateway) => {
                state.default_routes.remove(&gateway);
                Ok(())
            }
            None => Err(CapabilityError::Absent),
        }
    }
}

#[async_trait]
impl DhcpClient for FakeHost {
    async fn release(&self, interface: &str) -> Result<(), CapabilityError> {
        let mut state = self.state();
        state.log.push(format!("release {interface}"));
        match state.leases.remove(interface) {
            Some(lease) => {
                state.default_routes.remove(&lease.gateway);
                state.lease_resolvers.clear();
                Ok(())
            }
            None => Err(CapabilityError::Absent),
        }
    }

    async fn request_lease(&self, interface: &str) -> Result<LeaseOutcome, CapabilityError> {
        let hang = {
            let mut state = self.state();
            state.log.push(format!("request {interface}"));
            state.hang_requests
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let mut state = self.state();
        if !state.links_up.contains(interface) {
            return Err(CapabilityError::CommandFailed {
                command: format!("dhclient -1 {interface}"),
                status: "exit status: 1".into(),
                stderr: "link is down".into(),
            });
        }
        let Some(mac) = state.link_macs.get(interface).copied() else {
            return Ok(LeaseOutcome::TimedOut);
        };
        let Some(allocation) = state.bindings.get(&mac).copied() else {
            return Ok(LeaseOutcome::TimedOut);
        };

        state.leases.insert(interface.to_string(), allocation);
        state.default_routes.insert(allocation.gateway);
        state.lease_resolvers = vec![IpAddr::V4(allocation.nameserver)];
        state.hidden_polls = state.convergence_lag;
        Ok(LeaseOutcome::Acquired)
    }
}

#[async_trait]
impl NetworkIntrospection for FakeHost {
    async fn interface_ipv4(&self, interface: &str) -> Result<Option<InterfaceAddress>, CapabilityError> {
        let mut state = self.state();
        state.polls += 1;
        if state.hidden_polls > 0 {
            state.hidden_polls -= 1;
            return Ok(None);
        }
        Ok(state.leases.get(interface).map(|lease| InterfaceAddress {
            address: lease.address,
            netmask: lease.netmask,
        }))
    }

    async fn default_gateways(&self) -> Result<BTreeSet<Ipv4Addr>, CapabilityError> {
        Ok(self.state().default_routes.clone())
    }

    async fn configured_resolvers(&self) -> Result<Vec<IpAddr>, CapabilityError> {
        let state = self.state();
        Ok(state
            .static_resolvers
            .iter()
            .chain(state.lease_resolvers.iter())
            .copied()
            .collect())
    }
}

#[async_trait]
impl HostResolver for FakeHost {
    async fn resolve(&self, hostname: &str) -> Result<Option<Ipv4Addr>, CapabilityError> {
        Ok(self.state().hosts.get(hostname).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_derives_netmask_from_prefix() {
        let allocation = Allocation::new(Ipv4Addr::new(10, 2, 0, 13), 16, Ipv4Addr::new(10, 2, 0, 1));
        assert_eq!(allocation.netmask, Ipv4Addr::new(255, 255, 0, 0));
        let allocation = Allocation::new(Ipv4Addr::new(10, 0, 0, 10), 24, Ipv4Addr::new(10, 0, 0, 1));
        assert_eq!(allocation.netmask, Ipv4Addr::new(255, 255, 255, 0));
    }
}
