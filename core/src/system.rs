//! Host implementations of the capability traits.
//!
//! Link and lease management shell out to `ip` and `dhclient`, optionally
//! through `sudo`. Introspection reads the interface table, the kernel
//! routing table and `resolv.conf`. Names are resolved by the OS resolver.

use std::sync::Arc;

use leasecheck_common::config::EngineConfig;
use leasecheck_common::system::{DhcpClient, HostResolver, LinkControl, NetworkIntrospection};

pub mod command;
pub mod dhclient;
pub mod introspection;
pub mod iproute;
pub mod resolver;

use command::CommandRunner;
use dhclient::Dhclient;
use introspection::HostIntrospection;
use iproute::IpRoute;
use resolver::SystemResolver;

/// The four collaborators the engine is built on.
#[derive(Clone)]
pub struct Capabilities {
    pub link: Arc<dyn LinkControl>,
    pub dhcp: Arc<dyn DhcpClient>,
    pub introspection: Arc<dyn NetworkIntrospection>,
    pub resolver: Arc<dyn HostResolver>,
}

impl Capabilities {
    /// Capabilities acting on the machine this process runs on.
    pub fn host(cfg: &EngineConfig) -> Self {
        let runner = CommandRunner::new(cfg.elevate);
        Self {
            link: Arc::new(IpRoute::new(runner.clone())),
            dhcp: Arc::new(Dhclient::new(runner)),
            introspection: Arc::new(HostIntrospection::new(
                cfg.route_table.clone(),
                cfg.resolv_conf.clone(),
            )),
            resolver: Arc::new(SystemResolver),
        }
    }
}
