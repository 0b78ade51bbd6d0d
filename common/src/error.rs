//! Error taxonomy of the engine.
//!
//! Observation, resolution and convergence failures are control flow and get
//! their own types. Expectation mismatches are data and live in
//! [`crate::report`] instead.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Failure reported by one of the injected capabilities.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// There was nothing to act on, e.g. no default route to delete or no lease to release.
    #[error("nothing to act on")]
    Absent,
    #[error("`{command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{operation} did not complete within {}s", .timeout.as_secs_f64())]
    TimedOut {
        operation: String,
        timeout: Duration,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Parse(String),
}

/// The ordered steps of a convergence cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConvergenceStep {
    DeleteDefaultRoute,
    SetLinkAddress,
    SetLinkUp,
    ReleaseLease,
    RequestLease,
}

impl fmt::Display for ConvergenceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConvergenceStep::DeleteDefaultRoute => "delete default route",
            ConvergenceStep::SetLinkAddress => "set link address",
            ConvergenceStep::SetLinkUp => "set link up",
            ConvergenceStep::ReleaseLease => "release lease",
            ConvergenceStep::RequestLease => "request lease",
        };
        f.write_str(name)
    }
}

/// A convergence step failed. Carries the step so the report can name it.
#[derive(Debug, Error)]
#[error("convergence step '{step}' failed: {cause}")]
pub struct ConvergenceError {
    pub step: ConvergenceStep,
    pub cause: CapabilityError,
}

impl ConvergenceError {
    pub fn new(step: ConvergenceStep, cause: CapabilityError) -> Self {
        Self { step, cause }
    }
}

#[derive(Debug, Error)]
pub enum ObserveError {
    /// The interface has no IPv4 entry (yet).
    #[error("address info for {interface} not found")]
    InterfaceNotFound { interface: String },
    #[error("failed to read network state: {0}")]
    Introspection(#[from] CapabilityError),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no address record for {hostname}")]
    ResolutionFailed { hostname: String },
    #[error("lookup of {hostname} failed: {cause}")]
    Lookup {
        hostname: String,
        cause: CapabilityError,
    },
}

/// Rejected while building an [`crate::expectation::ExpectationModel`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("no address expectation given")]
    MissingAddress,
    #[error("both an exact address and an address prefix were given")]
    ConflictingAddress,
    #[error("no netmask expectation given")]
    MissingNetmask,
    #[error("{kind} membership must name at least one address")]
    EmptyMembership { kind: &'static str },
    #[error("invalid MAC address '{0}'")]
    InvalidMac(String),
    #[error("invalid IPv4 address '{0}'")]
    InvalidAddress(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("retry attempts must be at least 1")]
    ZeroAttempts,
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(&'static str),
}
