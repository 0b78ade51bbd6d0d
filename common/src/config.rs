use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Fixed-interval polling budget for observing a converging interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            backoff: Duration::from_secs(1),
        }
    }
}

pub struct EngineConfig {
    pub retry: RetryPolicy,
    /// Upper bound for a single synchronous lease request.
    pub lease_timeout: Duration,
    /// Upper bound for a whole scenario, convergence and polling included.
    pub scenario_timeout: Duration,
    /// Prefix privileged commands with `sudo`.
    pub elevate: bool,
    pub route_table: PathBuf,
    pub resolv_conf: PathBuf,
    /// Interface used by scenarios that do not name one.
    pub default_interface: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            lease_timeout: Duration::from_secs(30),
            scenario_timeout: Duration::from_secs(120),
            elevate: false,
            route_table: PathBuf::from("/proc/net/route"),
            resolv_conf: PathBuf::from("/etc/resolv.conf"),
            default_interface: String::from("eth1"),
        }
    }
}

/// Optional `[settings]` table of a catalog file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub interface: Option<String>,
    pub attempts: Option<u32>,
    pub backoff_ms: Option<u64>,
    pub lease_timeout_secs: Option<u64>,
    pub scenario_timeout_secs: Option<u64>,
}

impl EngineConfig {
    /// Overlays the values a catalog file sets.
    pub fn apply(&mut self, settings: &Settings) {
        if let Some(interface) = &settings.interface {
            self.default_interface = interface.clone();
        }
        if let Some(attempts) = settings.attempts {
            self.retry.attempts = attempts;
        }
        if let Some(backoff) = settings.backoff_ms {
            self.retry.backoff = Duration::from_millis(backoff);
        }
        if let Some(secs) = settings.lease_timeout_secs {
            self.lease_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = settings.scenario_timeout_secs {
            self.scenario_timeout = Duration::from_secs(secs);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.lease_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("lease"));
        }
        if self.scenario_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout("scenario"));
        }
        Ok(())
    }
}
