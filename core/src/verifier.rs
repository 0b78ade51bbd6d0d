//! Judges one scenario against the live state.

use std::time::Instant;

use tracing::{debug, error, warn};

use leasecheck_common::config::RetryPolicy;
use leasecheck_common::error::ResolveError;
use leasecheck_common::expectation::ExpectationModel;
use leasecheck_common::network::state::ObservedNetworkState;
use leasecheck_common::report::{ExpectationMismatch, Failure, ScenarioResult};

use crate::catalog::Scenario;
use crate::driver::ConvergenceDriver;
use crate::observer::StateObserver;

pub struct Verifier {
    driver: ConvergenceDriver,
    observer: StateObserver,
    retry: RetryPolicy,
}

impl Verifier {
    pub fn new(driver: ConvergenceDriver, observer: StateObserver, retry: RetryPolicy) -> Self {
        Self {
            driver,
            observer,
            retry,
        }
    }

    pub fn observer(&self) -> &StateObserver {
        &self.observer
    }

    /// Converges the scenario's interface, waits for the state to show up and
    /// collects every mismatch.
    ///
    /// A failed convergence step ends the scenario with that single failure.
    /// Mismatches never short-circuit.
    pub async fn verify(&self, scenario: &Scenario) -> ScenarioResult {
        let started = Instant::now();
        let model = &scenario.model;

        if let Err(err) = self
            .driver
            .converge(model.interface(), model.reset_default_route())
            .await
        {
            error!("{err}");
            return ScenarioResult::failed(&scenario.name, err, started.elapsed());
        }

        let Some(state) = self.poll(&model.interface().name).await else {
            return ScenarioResult::failed(
                &scenario.name,
                Failure::StateUnavailable {
                    attempts: self.retry.attempts,
                },
                started.elapsed(),
            );
        };

        let mut failures: Vec<Failure> = check_state(model, &state)
            .into_iter()
            .map(Failure::from)
            .collect();
        failures.extend(self.check_hostnames(model).await.into_iter().map(Failure::from));

        ScenarioResult::new(&scenario.name, failures, Some(state), started.elapsed())
    }

    /// Polls until the interface reports an IPv4 state or the budget runs out.
    async fn poll(&self, interface: &str) -> Option<ObservedNetworkState> {
        let attempts = self.retry.attempts;
        for attempt in 1..=attempts {
            match self.observer.observe(interface).await {
                Ok(state) => return Some(state),
                Err(err) if attempt < attempts => {
                    debug!(attempt, attempts, "{err}, retrying in {:?}", self.retry.backoff);
                    tokio::time::sleep(self.retry.backoff).await;
                }
                Err(err) => warn!(attempt, attempts, "{err}, giving up"),
            }
        }
        None
    }

    async fn check_hostnames(&self, model: &ExpectationModel) -> Vec<ExpectationMismatch> {
        let mut mismatches = Vec::new();
        for expectation in model.hostnames() {
            match self.observer.resolve_hostname(&expectation.hostname).await {
                Ok(address) if expectation.matches(address) => {}
                Ok(address) => mismatches.push(ExpectationMismatch::Hostname {
                    hostname: expectation.hostname.clone(),
                    expected: expectation.expected.clone(),
                    match_mode: expectation.match_mode,
                    observed: address,
                }),
                Err(err) => mismatches.push(ExpectationMismatch::Unresolved {
                    hostname: expectation.hostname.clone(),
                    reason: unresolved_reason(&err),
                }),
            }
        }
        mismatches
    }
}

fn unresolved_reason(err: &ResolveError) -> String {
    match err {
        ResolveError::ResolutionFailed { .. } => String::from("no address record"),
        ResolveError::Lookup { cause, .. } => cause.to_string(),
    }
}

/// Compares one observation with the interface-level expectations.
pub fn check_state(
    model: &ExpectationModel,
    state: &ObservedNetworkState,
) -> Vec<ExpectationMismatch> {
    let mut mismatches = Vec::new();

    if !model.address().matches(state.address) {
        mismatches.push(ExpectationMismatch::Address {
            expected: model.address().clone(),
            observed: state.address,
        });
    }

    if model.netmask() != state.netmask {
        mismatches.push(ExpectationMismatch::Netmask {
            expected: model.netmask(),
            observed: state.netmask,
        });
    }

    for required in model.gateways() {
        if !state.gateways.contains(required) {
            mismatches.push(ExpectationMismatch::MissingGateway {
                required: *required,
                observed: state.gateways.clone(),
            });
        }
    }

    for required in model.resolvers() {
        if !state.resolvers.contains(required) {
            mismatches.push(ExpectationMismatch::MissingResolver {
                required: *required,
                observed: state.resolvers.clone(),
            });
        }
    }

    mismatches
}
