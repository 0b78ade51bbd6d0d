//! # Scenario catalog
//!
//! Ordered, named scenarios loaded from a TOML topology description.
//!
//! A catalog declares networks the way the DHCP service is provisioned
//! (subnet, gateways, nameservers, DNS domain) and scenarios that pin a MAC
//! on an interface and state what the resulting lease must look like.
//! Scenarios inherit netmask, gateways and resolvers from the network they
//! reference and may override each of them. Declaration order is execution
//! order.

use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use pnet::ipnetwork::Ipv4Network;
use pnet::util::MacAddr;
use serde::Deserialize;
use thiserror::Error;

use leasecheck_common::config::{EngineConfig, Settings};
use leasecheck_common::error::ModelError;
use leasecheck_common::expectation::{ExpectationModel, HostnameExpectation};
use leasecheck_common::network::interface::InterfaceIdentity;
use leasecheck_common::network::mac;

const BUILTIN: &[(&str, &str)] = &[
    ("basic", include_str!("../catalogs/basic.toml")),
    ("little", include_str!("../catalogs/little.toml")),
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("network '{network}' has an invalid subnet '{subnet}'")]
    InvalidSubnet { network: String, subnet: String },
    #[error("network '{0}' is declared twice")]
    DuplicateNetwork(String),
    #[error("scenario '{0}' is declared twice")]
    DuplicateScenario(String),
    #[error("scenario '{scenario}' references unknown network '{network}'")]
    UnknownNetwork { scenario: String, network: String },
    #[error("invalid scenario '{scenario}'")]
    Model {
        scenario: String,
        #[source]
        source: ModelError,
    },
    #[error("no scenario named '{0}'")]
    UnknownScenario(String),
    #[error("no built-in catalog named '{0}'")]
    UnknownBuiltin(String),
    #[error("catalog declares no scenarios")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    settings: Settings,
    #[serde(default, rename = "network")]
    networks: Vec<NetworkEntry>,
    #[serde(default, rename = "scenario")]
    scenarios: Vec<ScenarioEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NetworkEntry {
    name: String,
    subnet4: String,
    #[serde(default)]
    gateways: Vec<Ipv4Addr>,
    #[serde(default)]
    nameservers: Vec<IpAddr>,
    domain: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioEntry {
    name: String,
    network: Option<String>,
    interface: Option<String>,
    #[serde(deserialize_with = "mac::deserialize")]
    mac: MacAddr,
    #[serde(default)]
    reset_default_route: bool,
    address: Option<String>,
    address_prefix: Option<String>,
    netmask: Option<Ipv4Addr>,
    gateways: Option<Vec<Ipv4Addr>>,
    resolvers: Option<Vec<IpAddr>>,
    #[serde(default, rename = "hostname")]
    hostnames: Vec<HostnameEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HostnameEntry {
    name: String,
    address: Option<String>,
    address_prefix: Option<String>,
}

/// Network defaults after validation.
struct Network {
    netmask: Ipv4Addr,
    gateways: Vec<Ipv4Addr>,
    nameservers: Vec<IpAddr>,
    domain: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    pub name: String,
    pub model: ExpectationModel,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    settings: Settings,
    scenarios: Vec<Scenario>,
}

impl Catalog {
    /// Parses a catalog. Scenarios without an interface fall back to the
    /// file's `[settings] interface`, then to `cfg.default_interface`.
    pub fn from_toml(text: &str, cfg: &EngineConfig) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text)?;
        if file.scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut networks: HashMap<String, Network> = HashMap::new();
        for entry in file.networks {
            let name = entry.name.clone();
            let network = Network::try_from(entry)?;
            if networks.insert(name.clone(), network).is_some() {
                return Err(CatalogError::DuplicateNetwork(name));
            }
        }

        let fallback_interface = file
            .settings
            .interface
            .as_deref()
            .unwrap_or(&cfg.default_interface);

        let mut seen: HashSet<String> = HashSet::new();
        let mut scenarios = Vec::with_capacity(file.scenarios.len());
        for entry in file.scenarios {
            if !seen.insert(entry.name.clone()) {
                return Err(CatalogError::DuplicateScenario(entry.name));
            }
            scenarios.push(build_scenario(entry, &networks, fallback_interface)?);
        }

        Ok(Self {
            settings: file.settings,
            scenarios,
        })
    }

    pub fn load(path: &Path, cfg: &EngineConfig) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, cfg)
    }

    pub fn builtin(name: &str, cfg: &EngineConfig) -> Result<Self, CatalogError> {
        let (_, text) = BUILTIN
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .ok_or_else(|| CatalogError::UnknownBuiltin(name.to_string()))?;
        Self::from_toml(text, cfg)
    }

    pub fn builtin_names() -> impl Iterator<Item = &'static str> {
        BUILTIN.iter().map(|(name, _)| *name)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Keeps only the named scenarios, in catalog order.
    pub fn retain_only(&mut self, names: &[String]) -> Result<(), CatalogError> {
        if names.is_empty() {
            return Ok(());
        }
        if let Some(unknown) = names
            .iter()
            .find(|name| !self.scenarios.iter().any(|s| &s.name == *name))
        {
            return Err(CatalogError::UnknownScenario(unknown.clone()));
        }
        self.scenarios.retain(|s| names.contains(&s.name));
        Ok(())
    }
}

impl TryFrom<NetworkEntry> for Network {
    type Error = CatalogError;

    fn try_from(entry: NetworkEntry) -> Result<Self, Self::Error> {
        let subnet: Ipv4Network =
            entry.subnet4
                .parse()
                .map_err(|_| CatalogError::InvalidSubnet {
                    network: entry.name.clone(),
                    subnet: entry.subnet4.clone(),
                })?;
        Ok(Self {
            netmask: subnet.mask(),
            gateways: entry.gateways,
            nameservers: entry.nameservers,
            domain: entry.domain,
        })
    }
}

fn build_scenario(
    entry: ScenarioEntry,
    networks: &HashMap<String, Network>,
    fallback_interface: &str,
) -> Result<Scenario, CatalogError> {
    let network = match &entry.network {
        Some(name) => Some(networks.get(name).ok_or_else(|| CatalogError::UnknownNetwork {
            scenario: entry.name.clone(),
            network: name.clone(),
        })?),
        None => None,
    };
    let invalid = |source: ModelError| CatalogError::Model {
        scenario: entry.name.clone(),
        source,
    };

    let interface = entry.interface.as_deref().unwrap_or(fallback_interface);
    let mut builder = ExpectationModel::builder(InterfaceIdentity::new(interface, entry.mac))
        .reset_default_route(entry.reset_default_route);

    if let Some(address) = &entry.address {
        builder = builder.exact_address(exact_ipv4(address).map_err(invalid)?);
    }
    if let Some(prefix) = &entry.address_prefix {
        builder = builder.address_prefix(prefix.as_str());
    }
    if let Some(netmask) = entry.netmask.or(network.map(|n| n.netmask)) {
        builder = builder.netmask(netmask);
    }

    let gateways = inherited(&entry.gateways, network.map(|n| &n.gateways), "gateway")
        .map_err(invalid)?;
    for gateway in gateways {
        builder = builder.gateway(*gateway);
    }

    let resolvers = inherited(&entry.resolvers, network.map(|n| &n.nameservers), "resolver")
        .map_err(invalid)?;
    for resolver in resolvers {
        builder = builder.resolver(*resolver);
    }

    let domain = network.and_then(|n| n.domain.as_deref());
    for hostname in &entry.hostnames {
        let expectation = hostname_expectation(hostname, domain).map_err(invalid)?;
        builder = builder.hostname(expectation);
    }

    let model = builder.build().map_err(invalid)?;
    Ok(Scenario {
        name: entry.name,
        model,
    })
}

/// An explicit override must not be empty; an absent one inherits.
fn inherited<'a, T>(
    explicit: &'a Option<Vec<T>>,
    from_network: Option<&'a Vec<T>>,
    kind: &'static str,
) -> Result<&'a [T], ModelError> {
    match explicit {
        Some(list) if list.is_empty() => Err(ModelError::EmptyMembership { kind }),
        Some(list) => Ok(list.as_slice()),
        None => Ok(from_network.map(Vec::as_slice).unwrap_or(&[])),
    }
}

fn hostname_expectation(
    entry: &HostnameEntry,
    domain: Option<&str>,
) -> Result<HostnameExpectation, ModelError> {
    let hostname = match domain {
        Some(domain) if !entry.name.contains('.') => format!("{}.{domain}", entry.name),
        _ => entry.name.clone(),
    };
    match (&entry.address, &entry.address_prefix) {
        (Some(address), None) => Ok(HostnameExpectation::exact(hostname, exact_ipv4(address)?)),
        (None, Some(prefix)) => Ok(HostnameExpectation::prefix(hostname, prefix.as_str())),
        (Some(_), Some(_)) => Err(ModelError::ConflictingAddress),
        (None, None) => Err(ModelError::MissingAddress),
    }
}

/// Exact expectations are compared as strings, so they have to be in the
/// canonical dotted-quad form the observer reports.
fn exact_ipv4(text: &str) -> Result<String, ModelError> {
    text.parse::<Ipv4Addr>()
        .map(|address| address.to_string())
        .map_err(|_| ModelError::InvalidAddress(text.to_string()))
}
