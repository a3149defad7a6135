//! Scenario runner and suite reporting
//!
//! Runs every scenario against a freshly provisioned session, records
//! per-scenario outcomes, and writes a machine-readable results file.
//! Environmental errors (no driver, no deployment) become skips;
//! everything else a scenario returns is a failure.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use neuroarc_common::{HarnessConfig, Result};

use crate::scenario::{Outcome, Scenario, ScenarioReport};
use crate::session::Provisioner;

pub const RESULTS_FILE: &str = "test-results.json";

/// Aggregated results for one suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub reports: Vec<ScenarioReport>,
}

impl SuiteResult {
    /// Process exit code: failures make the run red, skips do not.
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 {
            1
        } else {
            0
        }
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        info!(path = %path.as_ref().display(), "wrote suite results");
        Ok(())
    }
}

/// Drives scenarios through sessions built by a [`Provisioner`].
pub struct ScenarioRunner {
    provisioner: Provisioner,
}

impl ScenarioRunner {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            provisioner: Provisioner::new(config),
        }
    }

    pub fn provisioner(&self) -> &Provisioner {
        &self.provisioner
    }

    /// Run the given scenarios, one fresh session each.
    pub async fn run(&self, scenarios: &[Scenario]) -> SuiteResult {
        let started_at = chrono::Utc::now();
        let suite_start = Instant::now();
        let mut reports = Vec::with_capacity(scenarios.len());

        for scenario in scenarios {
            reports.push(self.run_one(*scenario).await);
        }

        let passed = reports
            .iter()
            .filter(|r| r.outcome == Outcome::Passed)
            .count();
        let skipped = reports
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Skipped(_)))
            .count();
        let failed = reports.len() - passed - skipped;

        info!(total = reports.len(), passed, failed, skipped, "suite finished");
        SuiteResult {
            started_at,
            duration_ms: suite_start.elapsed().as_millis() as u64,
            total: reports.len(),
            passed,
            failed,
            skipped,
            reports,
        }
    }

    pub async fn run_all(&self) -> SuiteResult {
        self.run(&Scenario::all()).await
    }

    async fn run_one(&self, scenario: Scenario) -> ScenarioReport {
        let start = Instant::now();
        let outcome = match self.provisioner.provision().await {
            Ok(mut session) => {
                let result = scenario.run(&mut session).await;
                if let Err(e) = session.close().await {
                    warn!(scenario = scenario.name(), error = %e, "session close failed");
                }
                match result {
                    Ok(()) => Outcome::Passed,
                    Err(e) if e.is_environmental() => {
                        warn!(scenario = scenario.name(), error = %e, "scenario skipped");
                        Outcome::Skipped(e.to_string())
                    }
                    Err(e) => {
                        error!(scenario = scenario.name(), error = %e, "scenario failed");
                        Outcome::Failed(e.to_string())
                    }
                }
            }
            Err(e) if e.is_environmental() => {
                warn!(scenario = scenario.name(), error = %e, "no session available");
                Outcome::Skipped(e.to_string())
            }
            Err(e) => {
                error!(scenario = scenario.name(), error = %e, "provisioning failed");
                Outcome::Failed(e.to_string())
            }
        };
        ScenarioReport {
            name: scenario.name().to_string(),
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    }
}
