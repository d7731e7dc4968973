//! Login screen.

use crate::page_object::PageObject;
use crate::result::ProbeResult;
use crate::routes::Route;
use crate::session::Session;
use crate::wait::{wait_until, Condition};
use async_trait::async_trait;
use tracing::info;

/// Login screen controls
pub mod locators {
    use crate::locator::Locator;

    /// User name input
    pub const USERNAME: Locator = Locator::id("login user name", "login");
    /// Password input
    pub const PASSWORD: Locator = Locator::id("login password", "password");
    /// Submit button
    pub const SUBMIT: Locator = Locator::id("login button", "btn-login");
}

/// Login form page
#[derive(Debug, Clone, Copy)]
pub struct LoginPage<'a> {
    session: &'a Session,
}

impl<'a> LoginPage<'a> {
    /// Bind to the session
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Open the form, submit the credentials, and wait until the
    /// application redirects away from the login screen.
    ///
    /// # Errors
    ///
    /// Returns a timeout if the redirect does not happen within the page
    /// load bound (typically rejected credentials).
    pub async fn login(&self, username: &str, password: &str) -> ProbeResult<()> {
        self.get().await?;
        self.replace_text(&locators::USERNAME, username).await?;
        self.replace_text(&locators::PASSWORD, password).await?;
        self.click(&locators::SUBMIT).await?;
        let _ = wait_until(
            self.session.driver(),
            &Condition::url_lacks(Route::Login.marker()),
            &self.load_options(),
        )
        .await?;
        info!(username, "logged in");
        Ok(())
    }
}

#[async_trait]
impl PageObject for LoginPage<'_> {
    fn session(&self) -> &Session {
        self.session
    }

    fn route(&self) -> Route {
        Route::Login
    }

    fn page_name(&self) -> &'static str {
        "login"
    }

    fn url_pattern(&self) -> &'static str {
        "/user/login"
    }

    fn ready_condition(&self) -> Condition {
        Condition::visibility_of(locators::USERNAME)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::driver::{MockDriver, MockElement};
    use std::sync::Arc;

    fn fast_config() -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.timeouts.page_load_ms = 150;
        config.timeouts.poll_ms = 10;
        config
    }

    fn login_form(driver: &MockDriver) {
        driver.add_element(locators::USERNAME.selector(), MockElement::with_value(""));
        driver.add_element(locators::PASSWORD.selector(), MockElement::with_value(""));
        driver.add_element(locators::SUBMIT.selector(), MockElement::with_text("Login"));
    }

    #[tokio::test]
    async fn test_login_types_credentials() {
        let driver = Arc::new(MockDriver::new());
        login_form(&driver);
        let session = Session::new(Arc::clone(&driver), fast_config());

        // the mock never redirects, so the final wait times out
        let err = LoginPage::new(&session)
            .login("admin", "admin")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("url leaves \"/user/login\""));

        let user = driver.element(locators::USERNAME.selector()).unwrap();
        assert_eq!(user.attributes.get("value").map(String::as_str), Some("admin"));
        assert!(driver.was_called("click:id=btn-login"));
    }

    #[tokio::test]
    async fn test_missing_form_times_out_on_readiness() {
        let driver = Arc::new(MockDriver::new());
        let session = Session::new(Arc::clone(&driver), fast_config());
        let err = LoginPage::new(&session).get().await.unwrap_err();
        assert!(err.is_timeout());
    }
}
