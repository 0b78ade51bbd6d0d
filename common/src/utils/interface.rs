use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::network::state::InterfaceAddress;

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    fn get_ipv4_address(&self) -> Option<InterfaceAddress>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| {
                if let IpNetwork::V4(ipv4) = ip {
                    Some(*ipv4)
                } else {
                    None
                }
            })
            .collect()
    }

    /// The first IPv4 entry of the interface, the one a lease installs.
    fn get_ipv4_address(&self) -> Option<InterfaceAddress> {
        self.get_ipv4_nets()
            .into_iter()
            .next()
            .map(|net| InterfaceAddress {
                address: net.ip(),
                netmask: net.mask(),
            })
    }
}
