//! Browser session shared by every page object of a run.

use crate::config::HarnessConfig;
use crate::driver::Driver;
use crate::result::ProbeResult;
use crate::routes::Route;
use tracing::info;

/// One live driver plus the fixture references the scenarios need.
///
/// Created once per run by the caller and handed to page objects by
/// reference; page objects never own or recreate it.
pub struct Session {
    driver: Box<dyn Driver>,
    config: HarnessConfig,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.config.base_url())
            .field("project", &self.config.project)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Wrap an already started driver
    #[must_use]
    pub fn new(driver: impl Driver + 'static, config: HarnessConfig) -> Self {
        Self {
            driver: Box::new(driver),
            config,
        }
    }

    /// Launch Chromium with the configured browser settings
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the browser
    /// cannot be started.
    #[cfg(feature = "browser")]
    pub async fn launch(config: HarnessConfig) -> ProbeResult<Self> {
        config.validate()?;
        let driver = crate::browser::ChromiumDriver::launch(&config.browser).await?;
        info!(base_url = config.base_url(), project = %config.project, "browser session started");
        Ok(Self::new(driver, config))
    }

    /// The live driver
    #[must_use]
    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    /// Effective configuration
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Fixture project
    #[must_use]
    pub fn project(&self) -> &str {
        &self.config.project
    }

    /// Absolute URL of a route
    #[must_use]
    pub fn url_for(&self, route: &Route) -> String {
        route.url(self.config.base_url())
    }

    /// Navigate to an absolute URL
    ///
    /// # Errors
    ///
    /// Returns a navigation error from the driver.
    pub async fn navigate(&self, url: &str) -> ProbeResult<()> {
        info!(url, "navigate");
        self.driver.navigate(url).await
    }

    /// Current page URL
    ///
    /// # Errors
    ///
    /// Returns a driver error if the URL cannot be read.
    pub async fn current_url(&self) -> ProbeResult<String> {
        self.driver.current_url().await
    }

    /// Job name for a scenario, suffixed with a random token when
    /// `unique_job_names` is set.
    #[must_use]
    pub fn job_name(&self, base: &str) -> String {
        if self.config.unique_job_names {
            let token = uuid::Uuid::new_v4().simple().to_string();
            format!("{base} {}", &token[..8])
        } else {
            base.to_string()
        }
    }

    /// Tear down the browser
    ///
    /// # Errors
    ///
    /// Returns a driver error if the browser does not close cleanly.
    pub async fn close(self) -> ProbeResult<()> {
        info!("closing session");
        self.driver.close().await
    }
}
