//! Capabilities the engine drives the host through.
//!
//! Each trait is one external collaborator: link configuration, the DHCP
//! client, network introspection and hostname resolution. The engine only
//! ever sees these traits, which is what makes it testable without real
//! network hardware.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use pnet::util::MacAddr;

use crate::error::CapabilityError;
use crate::network::state::InterfaceAddress;

#[async_trait]
pub trait LinkControl: Send + Sync {
    async fn set_link_address(&self, interface: &str, mac: MacAddr) -> Result<(), CapabilityError>;
    async fn set_link_up(&self, interface: &str) -> Result<(), CapabilityError>;
    /// Returns [`CapabilityError::Absent`] when there is no default route.
    async fn delete_default_route(&self) -> Result<(), CapabilityError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseOutcome {
    Acquired,
    /// The client gave up without obtaining a lease.
    TimedOut,
}

#[async_trait]
pub trait DhcpClient: Send + Sync {
    /// Returns [`CapabilityError::Absent`] when no lease is held.
    async fn release(&self, interface: &str) -> Result<(), CapabilityError>;
    /// One synchronous negotiation attempt.
    async fn request_lease(&self, interface: &str) -> Result<LeaseOutcome, CapabilityError>;
}

#[async_trait]
pub trait NetworkIntrospection: Send + Sync {
    /// `None` when the interface carries no IPv4 address.
    async fn interface_ipv4(&self, interface: &str) -> Result<Option<InterfaceAddress>, CapabilityError>;
    async fn default_gateways(&self) -> Result<BTreeSet<Ipv4Addr>, CapabilityError>;
    /// Resolvers in priority order.
    async fn configured_resolvers(&self) -> Result<Vec<IpAddr>, CapabilityError>;
}

#[async_trait]
pub trait HostResolver: Send + Sync {
    /// `None` when the name has no IPv4 record.
    async fn resolve(&self, hostname: &str) -> Result<Option<Ipv4Addr>, CapabilityError>;
}
