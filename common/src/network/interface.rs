use std::fmt;

use pnet::util::MacAddr;

use crate::error::ModelError;
use crate::network::mac;

/// Link identity a scenario assigns before negotiating a lease.
///
/// Many DHCP servers key their allocation off the link-layer address, so the
/// MAC is part of what a scenario asserts against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceIdentity {
    pub name: String,
    pub mac: MacAddr,
}

impl InterfaceIdentity {
    pub fn new(name: impl Into<String>, mac: MacAddr) -> Self {
        Self {
            name: name.into(),
            mac,
        }
    }

    /// Builds an identity from the textual MAC form used in topology files.
    pub fn parse(name: impl Into<String>, mac: &str) -> Result<Self, ModelError> {
        Ok(Self::new(name, mac::parse(mac)?))
    }
}

impl fmt::Display for InterfaceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.mac)
    }
}
