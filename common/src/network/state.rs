use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};

/// IPv4 address and netmask configured on one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

/// Snapshot of the live network state as seen by one observation.
///
/// Produced fresh on every query. Gateways are system wide and IPv4 only;
/// resolvers keep the priority order of the system configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedNetworkState {
    pub interface: String,
    pub address: Ipv4Addr,
    pub netmask: Ipv4Addr,
    pub gateways: BTreeSet<Ipv4Addr>,
    pub resolvers: Vec<IpAddr>,
}
