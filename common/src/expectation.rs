//! Declarative description of what a converged interface must look like.

use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::error::ModelError;
use crate::network::interface::InterfaceIdentity;

/// How an observed value is compared with its expected string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Exact,
    /// Used when an allocator may hand out any address of a pool.
    Prefix,
}

impl MatchMode {
    pub fn matches(self, expected: &str, observed: &str) -> bool {
        match self {
            MatchMode::Exact => observed == expected,
            MatchMode::Prefix => observed.starts_with(expected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressExpectation {
    Exact(String),
    Prefix(String),
}

impl AddressExpectation {
    pub fn mode(&self) -> MatchMode {
        match self {
            AddressExpectation::Exact(_) => MatchMode::Exact,
            AddressExpectation::Prefix(_) => MatchMode::Prefix,
        }
    }

    pub fn expected(&self) -> &str {
        match self {
            AddressExpectation::Exact(value) | AddressExpectation::Prefix(value) => value,
        }
    }

    pub fn matches(&self, observed: Ipv4Addr) -> bool {
        self.mode().matches(self.expected(), &observed.to_string())
    }
}

impl fmt::Display for AddressExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressExpectation::Exact(value) => write!(f, "{value}"),
            AddressExpectation::Prefix(value) => write!(f, "{value}*"),
        }
    }
}

/// Forward resolution another node's name must produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostnameExpectation {
    pub hostname: String,
    pub expected: String,
    pub match_mode: MatchMode,
}

impl HostnameExpectation {
    pub fn exact(hostname: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            expected: address.into(),
            match_mode: MatchMode::Exact,
        }
    }

    pub fn prefix(hostname: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            expected: prefix.into(),
            match_mode: MatchMode::Prefix,
        }
    }

    pub fn matches(&self, observed: Ipv4Addr) -> bool {
        self.match_mode.matches(&self.expected, &observed.to_string())
    }
}

/// Expectations of one scenario. Immutable once built.
///
/// Gateway and resolver expectations are membership checks: the observed
/// set must contain every listed address, extra observed entries are fine.
/// An empty set means the scenario makes no claim about that aspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectationModel {
    interface: InterfaceIdentity,
    address: AddressExpectation,
    netmask: Ipv4Addr,
    gateways: BTreeSet<Ipv4Addr>,
    resolvers: BTreeSet<IpAddr>,
    hostnames: Vec<HostnameExpectation>,
    reset_default_route: bool,
}

impl ExpectationModel {
    pub fn builder(interface: InterfaceIdentity) -> ExpectationModelBuilder {
        ExpectationModelBuilder::new(interface)
    }

    pub fn interface(&self) -> &InterfaceIdentity {
        &self.interface
    }

    pub fn address(&self) -> &AddressExpectation {
        &self.address
    }

    pub fn netmask(&self) -> Ipv4Addr {
        self.netmask
    }

    pub fn gateways(&self) -> &BTreeSet<Ipv4Addr> {
        &self.gateways
    }

    pub fn resolvers(&self) -> &BTreeSet<IpAddr> {
        &self.resolvers
    }

    pub fn hostnames(&self) -> &[HostnameExpectation] {
        &self.hostnames
    }

    pub fn reset_default_route(&self) -> bool {
        self.reset_default_route
    }
}

#[derive(Debug, Clone)]
pub struct ExpectationModelBuilder {
    interface: InterfaceIdentity,
    address: Option<AddressExpectation>,
    conflicting_address: bool,
    netmask: Option<Ipv4Addr>,
    gateways: BTreeSet<Ipv4Addr>,
    resolvers: BTreeSet<IpAddr>,
    hostnames: Vec<HostnameExpectation>,
    reset_default_route: bool,
}

impl ExpectationModelBuilder {
    fn new(interface: InterfaceIdentity) -> Self {
        Self {
            interface,
            address: None,
            conflicting_address: false,
            netmask: None,
            gateways: BTreeSet::new(),
            resolvers: BTreeSet::new(),
            hostnames: Vec::new(),
            reset_default_route: false,
        }
    }

    pub fn exact_address(self, address: impl Into<String>) -> Self {
        self.with_address(AddressExpectation::Exact(address.into()))
    }

    pub fn address_prefix(self, prefix: impl Into<String>) -> Self {
        self.with_address(AddressExpectation::Prefix(prefix.into()))
    }

    fn with_address(mut self, expectation: AddressExpectation) -> Self {
        if self.address.is_some() {
            self.conflicting_address = true;
        }
        self.address = Some(expectation);
        self
    }

    pub fn netmask(mut self, netmask: Ipv4Addr) -> Self {
        self.netmask = Some(netmask);
        self
    }

    pub fn gateway(mut self, gateway: Ipv4Addr) -> Self {
        self.gateways.insert(gateway);
        self
    }

    pub fn resolver(mut self, resolver: impl Into<IpAddr>) -> Self {
        self.resolvers.insert(resolver.into());
        self
    }

    pub fn hostname(mut self, expectation: HostnameExpectation) -> Self {
        self.hostnames.push(expectation);
        self
    }

    pub fn reset_default_route(mut self, reset: bool) -> Self {
        self.reset_default_route = reset;
        self
    }

    pub fn build(self) -> Result<ExpectationModel, ModelError> {
        if self.conflicting_address {
            return Err(ModelError::ConflictingAddress);
        }
        let address = self.address.ok_or(ModelError::MissingAddress)?;
        let netmask = self.netmask.ok_or(ModelError::MissingNetmask)?;

        Ok(ExpectationModel {
            interface: self.interface,
            address,
            netmask,
            gateways: self.gateways,
            resolvers: self.resolvers,
            hostnames: self.hostnames,
            reset_default_route: self.reset_default_route,
        })
    }
}
