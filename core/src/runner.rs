//! Runs a catalog scenario by scenario.

use std::time::Duration;

use tracing::{Instrument, error, info, info_span};

use leasecheck_common::config::EngineConfig;
use leasecheck_common::report::{Failure, ScenarioResult};

use crate::catalog::Scenario;
use crate::driver::ConvergenceDriver;
use crate::observer::StateObserver;
use crate::system::Capabilities;
use crate::verifier::Verifier;

/// Results of one catalog run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    results: Vec<ScenarioResult>,
}

impl RunSummary {
    pub fn results(&self) -> &[ScenarioResult] {
        &self.results
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

pub struct CatalogRunner {
    verifier: Verifier,
    scenario_timeout: Duration,
}

impl CatalogRunner {
    pub fn new(verifier: Verifier, scenario_timeout: Duration) -> Self {
        Self {
            verifier,
            scenario_timeout,
        }
    }

    /// Wires the engine on top of `capabilities`.
    pub fn from_config(cfg: &EngineConfig, capabilities: Capabilities) -> Self {
        let driver = ConvergenceDriver::new(capabilities.link, capabilities.dhcp, cfg.lease_timeout);
        let observer = StateObserver::new(capabilities.introspection, capabilities.resolver);
        Self::new(Verifier::new(driver, observer, cfg.retry), cfg.scenario_timeout)
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    pub async fn run(&mut self, scenarios: &[Scenario]) -> RunSummary {
        self.run_with(scenarios, |_| {}).await
    }

    /// Executes `scenarios` strictly one after another and reports each
    /// result to `on_result` as soon as it is known.
    ///
    /// Takes `&mut self` so two runs can never share the interface and the
    /// route table at the same time.
    pub async fn run_with(
        &mut self,
        scenarios: &[Scenario],
        mut on_result: impl FnMut(&ScenarioResult),
    ) -> RunSummary {
        let mut results = Vec::with_capacity(scenarios.len());

        for scenario in scenarios {
            let span = info_span!(
                "scenario",
                name = %scenario.name,
                interface = %scenario.model.interface(),
                indicatif.pb_show = true
            );
            let result = self.run_one(scenario).instrument(span).await;

            if result.passed() {
                info!(scenario = %scenario.name, "passed");
            } else {
                error!(
                    scenario = %scenario.name,
                    failures = result.failures().len(),
                    "failed"
                );
            }
            on_result(&result);
            results.push(result);
        }

        RunSummary { results }
    }

    async fn run_one(&self, scenario: &Scenario) -> ScenarioResult {
        match tokio::time::timeout(self.scenario_timeout, self.verifier.verify(scenario)).await {
            Ok(result) => result,
            Err(_) => ScenarioResult::failed(
                &scenario.name,
                Failure::TimedOut {
                    budget: self.scenario_timeout,
                },
                self.scenario_timeout,
            ),
        }
    }
}
