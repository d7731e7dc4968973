//! Page Object Model support.
//!
//! A page object is bound to the run's [`Session`] and one [`Route`]. Its
//! accessors resolve a control afresh on every call and never cache handles,
//! so a handle obtained after a re-render is always live.
//!
//! The trait carries the shared mechanics (navigation, readiness, lookups,
//! reads); each screen adds one typed method per control on top.

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::result::{ProbeError, ProbeResult};
use crate::routes::{Route, UrlMatcher};
use crate::session::Session;
use crate::wait::{wait_for_element, wait_until, Condition, WaitOptions};
use async_trait::async_trait;
use tracing::{debug, info};

/// Trait for page objects representing one screen of the application.
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Session the page drives
    fn session(&self) -> &Session;

    /// Route the page is bound to
    fn route(&self) -> Route;

    /// Page name for logging/debugging
    fn page_name(&self) -> &'static str;

    /// URL pattern that matches this page (e.g. `/project/*/jobs`)
    fn url_pattern(&self) -> &'static str;

    /// Condition that holds once the screen is ready for interaction
    fn ready_condition(&self) -> Condition {
        Condition::url_contains(self.route().marker())
    }

    /// Bound for the readiness wait
    fn load_options(&self) -> WaitOptions {
        self.session().config().timeouts.page_load()
    }

    /// Navigate to the screen and return once it is ready
    ///
    /// # Errors
    ///
    /// Returns a navigation error, or a timeout if the screen never becomes
    /// ready.
    async fn get(&self) -> ProbeResult<()> {
        let url = self.session().url_for(&self.route());
        info!(page = self.page_name(), %url, "open page");
        self.session().navigate(&url).await?;
        self.wait_loaded().await
    }

    /// Wait for readiness without navigating (after a redirect or a
    /// navigation the caller performed itself)
    ///
    /// # Errors
    ///
    /// Returns a timeout naming the readiness condition.
    async fn wait_loaded(&self) -> ProbeResult<()> {
        let waited = wait_until(
            self.session().driver(),
            &self.ready_condition(),
            &self.load_options(),
        )
        .await?;
        debug!(
            page = self.page_name(),
            elapsed_ms = waited.elapsed.as_millis() as u64,
            "page ready"
        );
        Ok(())
    }

    /// Whether the browser currently shows this screen
    ///
    /// # Errors
    ///
    /// Returns a driver error if the URL cannot be read.
    async fn is_current(&self) -> ProbeResult<bool> {
        let url = self.session().current_url().await?;
        Ok(UrlMatcher::new(self.url_pattern()).matches(&url))
    }

    /// Resolve a control right now, without waiting
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::ElementNotFound`] if nothing matches.
    async fn find(&self, locator: &Locator) -> ProbeResult<ElementHandle> {
        self.session()
            .driver()
            .find_element(locator.selector())
            .await?
            .ok_or_else(|| ProbeError::ElementNotFound {
                name: locator.name().to_string(),
                selector: locator.selector().to_string(),
            })
    }

    /// Resolve a control once it is displayed
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError::Timeout`] if it is not displayed within the bound.
    async fn wait_for(&self, locator: &Locator, options: WaitOptions) -> ProbeResult<ElementHandle> {
        wait_for_element(self.session().driver(), locator, true, &options).await
    }

    /// Click a control
    ///
    /// # Errors
    ///
    /// Returns an error if the control is missing or the click fails.
    async fn click(&self, locator: &Locator) -> ProbeResult<()> {
        let element = self.find(locator).await?;
        debug!(page = self.page_name(), control = locator.name(), "click");
        self.session().driver().click(&element).await
    }

    /// Clear an input and type `text` into it
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing or does not accept input.
    async fn replace_text(&self, locator: &Locator, text: &str) -> ProbeResult<()> {
        let element = self.find(locator).await?;
        let driver = self.session().driver();
        driver.clear(&element).await?;
        driver.send_keys(&element, text).await
    }

    /// Rendered text of a control, trimmed
    ///
    /// # Errors
    ///
    /// Returns an error if the control is missing.
    async fn read_text(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.find(locator).await?;
        let text = self.session().driver().text(&element).await?;
        Ok(text.trim().to_string())
    }

    /// Current `value` of an input (empty if unset)
    ///
    /// # Errors
    ///
    /// Returns an error if the input is missing.
    async fn read_value(&self, locator: &Locator) -> ProbeResult<String> {
        let element = self.find(locator).await?;
        Ok(self
            .session()
            .driver()
            .attribute(&element, "value")
            .await?
            .unwrap_or_default())
    }

    /// Checked state of a radio or checkbox
    ///
    /// # Errors
    ///
    /// Returns an error if the control is missing.
    async fn is_checked(&self, locator: &Locator) -> ProbeResult<bool> {
        let element = self.find(locator).await?;
        self.session().driver().is_selected(&element).await
    }
}
