use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use leasecheck_common::error::CapabilityError;
use leasecheck_common::network::state::InterfaceAddress;
use leasecheck_common::system::NetworkIntrospection;
use leasecheck_common::utils::interface::NetworkInterfaceExtension;

/// Reads network state from the local host.
pub struct HostIntrospection {
    route_table: PathBuf,
    resolv_conf: PathBuf,
}

impl HostIntrospection {
    pub fn new(route_table: PathBuf, resolv_conf: PathBuf) -> Self {
        Self {
            route_table,
            resolv_conf,
        }
    }
}

#[async_trait]
impl NetworkIntrospection for HostIntrospection {
    async fn interface_ipv4(&self, interface: &str) -> Result<Option<InterfaceAddress>, CapabilityError> {
        Ok(pnet::datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == interface)
            .and_then(|iface| iface.get_ipv4_address()))
    }

    async fn default_gateways(&self) -> Result<BTreeSet<Ipv4Addr>, CapabilityError> {
        parse_route_table(&read(&self.route_table).await?)
    }

    async fn configured_resolvers(&self) -> Result<Vec<IpAddr>, CapabilityError> {
        Ok(parse_resolv_conf(&read(&self.resolv_conf).await?))
    }
}

async fn read(path: &Path) -> Result<String, CapabilityError> {
    Ok(tokio::fs::read_to_string(path).await?)
}

/// Extracts IPv4 default gateways from `/proc/net/route`.
///
/// A default route has destination and mask zero. Addresses are printed as
/// the hex of the in-memory network-order word, hence native-endian.
pub fn parse_route_table(table: &str) -> Result<BTreeSet<Ipv4Addr>, CapabilityError> {
    let mut gateways = BTreeSet::new();

    for line in table.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 {
            continue;
        }
        let destination = parse_hex_addr(fields[1])?;
        let gateway = parse_hex_addr(fields[2])?;
        let mask = parse_hex_addr(fields[7])?;

        if destination.is_unspecified() && mask.is_unspecified() && !gateway.is_unspecified() {
            gateways.insert(gateway);
        }
    }

    Ok(gateways)
}

fn parse_hex_addr(field: &str) -> Result<Ipv4Addr, CapabilityError> {
    u32::from_str_radix(field, 16)
        .map(|raw| Ipv4Addr::from(raw.to_ne_bytes()))
        .map_err(|_| CapabilityError::Parse(format!("invalid route table address '{field}'")))
}

/// Nameservers of a `resolv.conf`, in file order.
pub fn parse_resolv_conf(conf: &str) -> Vec<IpAddr> {
    conf.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("nameserver"), Some(address)) => Some(address),
                _ => None,
            }
        })
        .filter_map(|address| {
            // Strip an IPv6 zone index such as `fe80::1%eth0`.
            let address = address.split('%').next().unwrap_or(address);
            match address.parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    warn!(address, "ignoring unparsable nameserver");
                    None
                }
            }
        })
        .collect()
}
