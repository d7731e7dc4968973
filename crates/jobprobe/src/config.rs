//! Harness configuration.
//!
//! Layering: defaults, then an optional YAML file, then `JOBPROBE_*`
//! environment variables. The CLI applies its flags on top.

use crate::browser::BrowserConfig;
use crate::result::{ProbeError, ProbeResult};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Login credentials for the application under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    /// User name
    pub username: String,
    /// Password
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

/// Wait bounds used by page objects and scenarios, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Screen readiness after a navigation
    pub page_load_ms: u64,
    /// Step editor closing after a step save
    pub step_close_ms: u64,
    /// Element waits inside a screen (modals, sections)
    pub element_ms: u64,
    /// Full reload after renaming a job
    pub reload_ms: u64,
    /// Fixed settle delay for transitions without a readiness signal
    pub settle_ms: u64,
    /// Poll interval for every explicit wait
    pub poll_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            page_load_ms: 25_000,
            step_close_ms: 15_000,
            element_ms: 10_000,
            reload_ms: 95_000,
            settle_ms: 500,
            poll_ms: 100,
        }
    }
}

impl Timeouts {
    /// Wait options for screen readiness
    #[must_use]
    pub const fn page_load(&self) -> WaitOptions {
        self.options(self.page_load_ms)
    }

    /// Wait options for the step editor closing
    #[must_use]
    pub const fn step_close(&self) -> WaitOptions {
        self.options(self.step_close_ms)
    }

    /// Wait options for in-screen elements
    #[must_use]
    pub const fn element(&self) -> WaitOptions {
        self.options(self.element_ms)
    }

    /// Wait options for a full reload
    #[must_use]
    pub const fn reload(&self) -> WaitOptions {
        self.options(self.reload_ms)
    }

    const fn options(&self, timeout_ms: u64) -> WaitOptions {
        WaitOptions {
            timeout_ms,
            poll_interval_ms: self.poll_ms,
        }
    }
}

/// What the fixture project is expected to contain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureExpectations {
    /// Nodes matched by the "all nodes" filter
    pub expected_matched_nodes: u32,
}

impl Default for FixtureExpectations {
    fn default() -> Self {
        Self {
            expected_matched_nodes: 1,
        }
    }
}

/// Complete harness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Base URL of the application, without trailing slash
    pub base_url: String,
    /// Fixture project the scenarios create jobs in
    pub project: String,
    /// Login credentials
    pub credentials: Credentials,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Wait bounds
    pub timeouts: Timeouts,
    /// Fixture expectations
    pub fixture: FixtureExpectations,
    /// Append a random suffix to scenario job names
    pub unique_job_names: bool,
    /// Where failure screenshots go (None = not captured)
    pub artifacts_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4440".to_string(),
            project: "SeleniumBasic".to_string(),
            credentials: Credentials::default(),
            browser: BrowserConfig::default(),
            timeouts: Timeouts::default(),
            fixture: FixtureExpectations::default(),
            unique_job_names: false,
            artifacts_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML file on top of the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> ProbeResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    /// Parse YAML on top of the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(raw: &str) -> ProbeResult<Self> {
        Ok(serde_yaml_ng::from_str(raw)?)
    }

    /// Render as YAML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Apply `JOBPROBE_*` / `CHROMIUM_PATH` overrides from the process
    /// environment
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean variable does not parse.
    pub fn with_env(self) -> ProbeResult<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    ///
    /// # Errors
    ///
    /// Returns an error if a boolean variable does not parse.
    pub fn with_env_from(mut self, get: impl Fn(&str) -> Option<String>) -> ProbeResult<Self> {
        if let Some(url) = get("JOBPROBE_BASE_URL") {
            self.base_url = url;
        }
        if let Some(project) = get("JOBPROBE_PROJECT") {
            self.project = project;
        }
        if let Some(username) = get("JOBPROBE_USERNAME") {
            self.credentials.username = username;
        }
        if let Some(password) = get("JOBPROBE_PASSWORD") {
            self.credentials.password = password;
        }
        if let Some(headless) = get("JOBPROBE_HEADLESS") {
            self.browser.headless = parse_bool("JOBPROBE_HEADLESS", &headless)?;
        }
        if let Some(path) = get("CHROMIUM_PATH") {
            self.browser.chromium_path = Some(path);
        }
        Ok(self)
    }

    /// Set base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set fixture project
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    /// Set timeouts
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set expected matched node count
    #[must_use]
    pub const fn with_expected_matched_nodes(mut self, count: u32) -> Self {
        self.fixture.expected_matched_nodes = count;
        self
    }

    /// Enable random job name suffixes
    #[must_use]
    pub const fn with_unique_job_names(mut self, unique: bool) -> Self {
        self.unique_job_names = unique;
        self
    }

    /// Set artifacts directory
    #[must_use]
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Base URL with any trailing slash removed
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns a configuration error describing the first problem found.
    pub fn validate(&self) -> ProbeResult<()> {
        if self.base_url().is_empty() {
            return Err(ProbeError::config("base_url must not be empty"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ProbeError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.project.trim().is_empty() {
            return Err(ProbeError::config("project must not be empty"));
        }
        let t = &self.timeouts;
        if [t.page_load_ms, t.step_close_ms, t.element_ms, t.reload_ms, t.poll_ms].contains(&0) {
            return Err(ProbeError::config("wait timeouts and poll interval must be non-zero"));
        }
        if self.fixture.expected_matched_nodes == 0 {
            return Err(ProbeError::config(
                "fixture.expected_matched_nodes must be at least 1",
            ));
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> ProbeResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ProbeError::config(format!(
            "{key} must be a boolean, got {other:?}"
        ))),
    }
}
