use std::net::{IpAddr, Ipv4Addr};

use async_trait::async_trait;
use tracing::debug;

use leasecheck_common::error::CapabilityError;
use leasecheck_common::system::HostResolver;

/// Forward lookups through the operating system resolver.
pub struct SystemResolver;

#[async_trait]
impl HostResolver for SystemResolver {
    async fn resolve(&self, hostname: &str) -> Result<Option<Ipv4Addr>, CapabilityError> {
        // getaddrinfo reports NXDOMAIN and friends as plain IO errors.
        let addrs = match tokio::net::lookup_host((hostname, 0)).await {
            Ok(addrs) => addrs,
            Err(err) => {
                debug!(hostname, %err, "lookup returned no records");
                return Ok(None);
            }
        };
        Ok(addrs.map(|addr| addr.ip()).find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        }))
    }
}
