//! Outcome of running one scenario.

use std::collections::BTreeSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::error::{ConvergenceError, ConvergenceStep};
use crate::expectation::{AddressExpectation, MatchMode};
use crate::network::state::ObservedNetworkState;

/// A single discrepancy between the expectation model and the live state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectationMismatch {
    Address {
        expected: AddressExpectation,
        observed: Ipv4Addr,
    },
    Netmask {
        expected: Ipv4Addr,
        observed: Ipv4Addr,
    },
    MissingGateway {
        required: Ipv4Addr,
        observed: BTreeSet<Ipv4Addr>,
    },
    MissingResolver {
        required: IpAddr,
        observed: Vec<IpAddr>,
    },
    Hostname {
        hostname: String,
        expected: String,
        match_mode: MatchMode,
        observed: Ipv4Addr,
    },
    Unresolved {
        hostname: String,
        reason: String,
    },
}

impl fmt::Display for ExpectationMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectationMismatch::Address { expected, observed } => match expected {
                AddressExpectation::Exact(addr) => {
                    write!(f, "address is {observed}, expected {addr}")
                }
                AddressExpectation::Prefix(prefix) => {
                    write!(f, "address {observed} does not start with {prefix}")
                }
            },
            ExpectationMismatch::Netmask { expected, observed } => {
                write!(f, "netmask is {observed}, expected {expected}")
            }
            ExpectationMismatch::MissingGateway { required, observed } => {
                write!(f, "gateway {required} not among [{}]", join(observed))
            }
            ExpectationMismatch::MissingResolver { required, observed } => {
                write!(f, "resolver {required} not among [{}]", join(observed))
            }
            ExpectationMismatch::Hostname {
                hostname,
                expected,
                match_mode,
                observed,
            } => match match_mode {
                MatchMode::Exact => {
                    write!(f, "{hostname} resolved to {observed}, expected {expected}")
                }
                MatchMode::Prefix => write!(
                    f,
                    "{hostname} resolved to {observed}, expected prefix {expected}"
                ),
            },
            ExpectationMismatch::Unresolved { hostname, reason } => {
                write!(f, "{hostname} did not resolve: {reason}")
            }
        }
    }
}

fn join<'a, T: fmt::Display + 'a>(items: impl IntoIterator<Item = &'a T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

/// Why a scenario failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Convergence {
        step: ConvergenceStep,
        reason: String,
    },
    StateUnavailable {
        attempts: u32,
    },
    TimedOut {
        budget: Duration,
    },
    Mismatch(ExpectationMismatch),
}

impl From<ConvergenceError> for Failure {
    fn from(err: ConvergenceError) -> Self {
        Failure::Convergence {
            step: err.step,
            reason: err.cause.to_string(),
        }
    }
}

impl From<ExpectationMismatch> for Failure {
    fn from(mismatch: ExpectationMismatch) -> Self {
        Failure::Mismatch(mismatch)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Convergence { step, reason } => {
                write!(f, "convergence step '{step}' failed: {reason}")
            }
            Failure::StateUnavailable { attempts } => {
                write!(f, "interface state unavailable after {attempts} attempts")
            }
            Failure::TimedOut { budget } => {
                write!(f, "scenario exceeded its {}s budget", budget.as_secs_f64())
            }
            Failure::Mismatch(mismatch) => write!(f, "{mismatch}"),
        }
    }
}

/// Terminal record of one scenario execution.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    name: String,
    passed: bool,
    failures: Vec<Failure>,
    observed: Option<ObservedNetworkState>,
    elapsed: Duration,
}

impl ScenarioResult {
    pub fn new(
        name: impl Into<String>,
        failures: Vec<Failure>,
        observed: Option<ObservedNetworkState>,
        elapsed: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            passed: failures.is_empty(),
            failures,
            observed,
            elapsed,
        }
    }

    pub fn failed(
        name: impl Into<String>,
        failure: impl Into<Failure>,
        elapsed: Duration,
    ) -> Self {
        Self::new(name, vec![failure.into()], None, elapsed)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Failures rendered the way the report prints them.
    pub fn diagnostics(&self) -> Vec<String> {
        self.failures.iter().map(Failure::to_string).collect()
    }

    pub fn observed(&self) -> Option<&ObservedNetworkState> {
        self.observed.as_ref()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
