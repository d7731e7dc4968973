//! Scenario runner and suite report.

use crate::pages::LoginPage;
use crate::result::{ProbeError, ProbeResult};
use crate::scenario::Scenario;
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Final state of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Ran to completion
    Passed,
    /// Stopped on an error
    Failed,
    /// Not run because an earlier scenario failed in fail-fast mode
    Skipped,
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario id
    pub id: String,
    /// Scenario title
    pub title: String,
    /// Final state
    pub status: Status,
    /// Wall time in milliseconds
    pub duration_ms: u64,
    /// Error classification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Error message with expected/actual values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Screenshot captured on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl ScenarioOutcome {
    fn skipped(scenario: &dyn Scenario) -> Self {
        Self {
            id: scenario.id().to_string(),
            title: scenario.title().to_string(),
            status: Status::Skipped,
            duration_ms: 0,
            error_kind: None,
            error: None,
            screenshot: None,
        }
    }
}

/// Results of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Application base URL
    pub base_url: String,
    /// Fixture project
    pub project: String,
    /// Start time (RFC 3339)
    pub started_at: String,
    /// Total wall time in milliseconds
    pub duration_ms: u64,
    /// Per-scenario outcomes in run order
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    /// Check if every scenario passed
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.status == Status::Passed)
    }

    /// Count passed scenarios
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.count(Status::Passed)
    }

    /// Count failed scenarios
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(Status::Failed)
    }

    /// Count skipped scenarios
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.count(Status::Skipped)
    }

    /// Failed outcomes
    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == Status::Failed)
            .collect()
    }

    /// Pretty JSON rendering
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> ProbeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON report to `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_json(&self, path: &Path) -> ProbeResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    fn count(&self, status: Status) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// Runs scenarios one after the other on a single session
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioRunner {
    /// Skip the remaining scenarios after the first failure
    pub fail_fast: bool,
    /// Skip the login step (the session is already authenticated)
    pub skip_login: bool,
}

impl ScenarioRunner {
    /// Create a new runner
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable fail-fast mode
    #[must_use]
    pub const fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    /// Do not log in before the first scenario
    #[must_use]
    pub const fn without_login(mut self) -> Self {
        self.skip_login = true;
        self
    }

    /// Log in, then run `scenarios` in order.
    ///
    /// A scenario failure is recorded in the report; it does not abort the
    /// run unless fail-fast is on.
    ///
    /// # Errors
    ///
    /// Returns an error only if the login itself fails.
    pub async fn run(
        &self,
        session: &Session,
        scenarios: &[Box<dyn Scenario>],
    ) -> ProbeResult<SuiteReport> {
        let started_at = chrono::Utc::now().to_rfc3339();
        let start = Instant::now();

        if !self.skip_login {
            let credentials = &session.config().credentials;
            LoginPage::new(session)
                .login(&credentials.username, &credentials.password)
                .await?;
        }

        let mut outcomes = Vec::with_capacity(scenarios.len());
        let mut failed = false;
        for scenario in scenarios {
            if failed && self.fail_fast {
                info!(scenario = scenario.id(), "skipped after earlier failure");
                outcomes.push(ScenarioOutcome::skipped(scenario.as_ref()));
                continue;
            }
            let outcome = run_one(session, scenario.as_ref()).await;
            failed |= outcome.status == Status::Failed;
            outcomes.push(outcome);
        }

        let report = SuiteReport {
            base_url: session.config().base_url().to_string(),
            project: session.project().to_string(),
            started_at,
            duration_ms: elapsed_ms(start),
            outcomes,
        };
        info!(
            passed = report.passed_count(),
            failed = report.failed_count(),
            skipped = report.skipped_count(),
            "suite finished"
        );
        Ok(report)
    }
}

async fn run_one(session: &Session, scenario: &dyn Scenario) -> ScenarioOutcome {
    info!(scenario = scenario.id(), title = scenario.title(), "scenario start");
    let start = Instant::now();
    let result = scenario.run(session).await;
    let duration_ms = elapsed_ms(start);

    let mut outcome = ScenarioOutcome {
        id: scenario.id().to_string(),
        title: scenario.title().to_string(),
        status: Status::Passed,
        duration_ms,
        error_kind: None,
        error: None,
        screenshot: None,
    };

    match result {
        Ok(()) => info!(scenario = scenario.id(), duration_ms, "scenario passed"),
        Err(err) => {
            error!(scenario = scenario.id(), kind = err.kind(), error = %err, "scenario failed");
            outcome.status = Status::Failed;
            outcome.error_kind = Some(err.kind().to_string());
            outcome.error = Some(err.to_string());
            outcome.screenshot = capture_failure(session, scenario.id()).await;
        }
    }
    outcome
}

// Screenshot problems are logged and otherwise ignored; they must not mask
// the scenario's own error.
async fn capture_failure(session: &Session, id: &str) -> Option<PathBuf> {
    let dir = session.config().artifacts_dir.as_ref()?;
    match save_screenshot(session, dir, id).await {
        Ok(path) => {
            info!(path = %path.display(), "failure screenshot saved");
            Some(path)
        }
        Err(err) => {
            warn!(error = %err, "could not capture failure screenshot");
            None
        }
    }
}

async fn save_screenshot(session: &Session, dir: &Path, id: &str) -> ProbeResult<PathBuf> {
    let png = session.driver().screenshot().await?;
    if png.is_empty() {
        return Err(ProbeError::driver("screenshot", "empty capture"));
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{id}-failure.png"));
    std::fs::write(&path, png)?;
    Ok(path)
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
